#![allow(dead_code)]

use gradescope_api::client::{Auth, Client};
use gradescope_api::creds::Creds;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EMAIL: &str = "prof@example.edu";
pub const PASSWORD: &str = "hunter2";

pub const LOGIN_PAGE: &str = r#"
<html>
  <head><meta name="csrf-token" content="unused"></head>
  <body>
    <form action="/login" method="post">
      <input type="hidden" name="utf8" value="&#x2713;">
      <input type="hidden" name="authenticity_token" value="login-token">
      <input type="email" name="session[email]">
      <input type="password" name="session[password]">
    </form>
  </body>
</html>
"#;

pub fn creds() -> Creds {
    Creds::new(EMAIL.to_owned(), PASSWORD.to_owned())
}

pub fn client(server: &MockServer) -> Client<gradescope_api::client::Init> {
    let base_url = Url::parse(&server.uri()).unwrap();
    Client::with_base_url(creds(), base_url).unwrap()
}

pub async fn mount_login_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(server)
        .await;
}

/// Login page plus a login endpoint that accepts the token from the page.
pub async fn logged_in(server: &MockServer) -> Client<Auth> {
    mount_login_page(server).await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("authenticity_token=login-token"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/account"))
        .expect(1)
        .mount(server)
        .await;

    client(server).setup().await.unwrap()
}

pub fn roster_page(rows: &[(&str, &str, &str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(role, user_id, email, sid)| {
            format!(
                r#"
                <tr class="rosterRow">
                  <td><button class="js-rosterName" data-url="/courses/1/gradebook.json?user_id={user_id}">x</button></td>
                  <td><select><option selected>{role}</option></select></td>
                  <td><button class="rosterCell--editIcon" data-email="{email}" data-cm='{{"full_name": "Name {user_id}", "first_name": "Name", "last_name": "{user_id}", "sid": "{sid}"}}'></button></td>
                </tr>
                "#
            )
        })
        .collect();
    format!("<html><body><table><tbody>{rows}</tbody></table></body></html>")
}

pub fn extensions_page(students: &str, due_date: &str, hard_due_date: Option<&str>) -> String {
    let hard_due_date = match hard_due_date {
        Some(date) => format!("\"{date}\""),
        None => "null".to_owned(),
    };
    format!(
        r#"
        <html>
          <head><meta name="csrf-token" content="csrf-123"></head>
          <body>
            <ul>
              <li data-react-class="AddExtension" data-react-props='{{"students": {students}, "assignment": {{"due_date": "{due_date}", "hard_due_date": {hard_due_date}}}}}'></li>
            </ul>
          </body>
        </html>
        "#
    )
}
