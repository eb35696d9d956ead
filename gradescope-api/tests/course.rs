mod common;

use chrono::{TimeZone, Utc};
use gradescope_api::Error;
use gradescope_api::course::CourseId;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{logged_in, roster_page};

async fn mount_roster_once(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/courses/1/memberships"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn roster_is_fetched_once_and_cached() {
    let server = MockServer::start().await;
    let gradescope = logged_in(&server).await;
    mount_roster_once(
        &server,
        roster_page(&[
            ("Instructor", "1", "prof@example.edu", ""),
            ("Student", "11", "ada@example.edu", "1815"),
            ("TA", "2", "ta@example.edu", ""),
            ("Student", "12", "alan@example.edu", "1912"),
        ]),
    )
    .await;
    let course = gradescope.course(CourseId::from("1"));

    let first: Vec<_> = course.get_roster().await.unwrap().to_vec();
    let second = course.get_roster().await.unwrap();

    let emails: Vec<_> = first.iter().map(|student| student.email()).collect();
    assert_eq!(emails, ["ada@example.edu", "alan@example.edu"]);
    assert_eq!(second.len(), first.len());
    for (cached, fetched) in second.iter().zip(&first) {
        assert_eq!(cached.user_id(), fetched.user_id());
        assert_eq!(cached.sid(), fetched.sid());
    }
}

#[tokio::test]
async fn concurrent_first_fetches_settle_on_one_roster() {
    let server = MockServer::start().await;
    let gradescope = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/courses/1/memberships"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(roster_page(&[("Student", "11", "ada@example.edu", "1815")])),
        )
        .mount(&server)
        .await;
    let course = gradescope.course(CourseId::from("1"));

    let (left, right) = futures::join!(course.get_roster(), course.get_roster());

    assert_eq!(left.unwrap().len(), 1);
    assert_eq!(right.unwrap().len(), 1);
    assert_eq!(course.get_roster().await.unwrap()[0].email(), "ada@example.edu");
}

#[tokio::test]
async fn roster_error_status_is_request_error() {
    let server = MockServer::start().await;
    let gradescope = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/courses/1/memberships"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let course = gradescope.course(CourseId::from("1"));
    let result = course.get_roster().await;

    match result {
        Err(Error::Request {
            status, target, body, ..
        }) => {
            assert_eq!(status.as_u16(), 500);
            assert!(target.ends_with("/courses/1/memberships"), "{target}");
            assert_eq!(body, "boom");
        }
        other => panic!("expected a request error, got {other:?}"),
    }
}

#[tokio::test]
async fn student_lookup_by_sid_or_email() {
    let server = MockServer::start().await;
    let gradescope = logged_in(&server).await;
    mount_roster_once(
        &server,
        roster_page(&[
            ("Student", "11", "ada@example.edu", "1815"),
            ("Student", "12", "alan@example.edu", "1912"),
        ]),
    )
    .await;
    let course = gradescope.course(CourseId::from("1"));

    let by_sid = course.get_student(Some("1912"), None).await.unwrap();
    assert_eq!(by_sid.map(|s| s.user_id().as_str()), Some("12"));

    let by_email = course
        .get_student(None, Some("ada@example.edu"))
        .await
        .unwrap();
    assert_eq!(by_email.map(|s| s.user_id().as_str()), Some("11"));

    // sid of one student, email of the other: the first row matching either wins
    let both = course
        .get_student(Some("1912"), Some("ada@example.edu"))
        .await
        .unwrap();
    assert_eq!(both.map(|s| s.user_id().as_str()), Some("11"));

    let missing = course
        .get_student(Some("0000"), Some("grace@example.edu"))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn student_lookup_needs_a_key() {
    let server = MockServer::start().await;
    let gradescope = logged_in(&server).await;
    let course = gradescope.course(CourseId::from("1"));

    let result = course.get_student(None, None).await;

    assert!(matches!(result, Err(Error::InvalidArgument(_))), "{result:?}");
}

#[tokio::test]
async fn assignments_are_fresh_with_utc_due_dates() {
    let server = MockServer::start().await;
    let gradescope = logged_in(&server).await;
    let props = r#"{"table_data": [
        {"id": "assignment_4191897", "title": "Homework 1", "submission_window": {"due_date": "2024-01-01T23:59:00"}},
        {"id": "assignment_4191898", "title": "Homework 2", "submission_window": {"due_date": "2024-07-01T23:59:00"}},
        {"id": "assignment_4191899", "title": "Project", "submission_window": {"due_date": "soon"}},
        {"id": "nounderscore", "title": "Survey"}
    ]}"#;
    Mock::given(method("GET"))
        .and(path("/courses/1/assignments"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<div data-react-class="AssignmentsTable" data-react-props='{props}'></div>"#
        )))
        .expect(2)
        .mount(&server)
        .await;
    let course = gradescope.course(CourseId::from("1"));

    let assignments = course.get_assignments().await.unwrap();
    course.get_assignments().await.unwrap();

    let ids: Vec<_> = assignments.iter().map(|a| a.id().as_str()).collect();
    assert_eq!(ids, ["4191897", "4191898", "4191899", ""]);
    assert_eq!(assignments[0].title(), "Homework 1");
    assert_eq!(assignments[0].course_id().as_str(), "1");
    assert_eq!(
        assignments[0].due_date(),
        Some(Utc.with_ymd_and_hms(2024, 1, 2, 4, 59, 0).unwrap())
    );
    assert_eq!(
        assignments[1].due_date(),
        Some(Utc.with_ymd_and_hms(2024, 7, 2, 3, 59, 0).unwrap())
    );
    assert_eq!(assignments[2].due_date(), None);
    assert_eq!(assignments[3].due_date(), None);
}

#[tokio::test]
async fn assignment_handles_from_id_or_url() {
    let server = MockServer::start().await;
    let gradescope = logged_in(&server).await;
    let course = gradescope
        .course_from_url("https://www.gradescope.com/courses/735697/")
        .unwrap();
    assert_eq!(course.id().as_str(), "735697");

    let from_url = course
        .get_assignment(
            None,
            Some("https://www.gradescope.com/courses/735697/assignments/4191897/review_grades"),
        )
        .unwrap();
    assert_eq!(from_url.id().as_str(), "4191897");
    assert_eq!(
        from_url.url().unwrap().path(),
        "/courses/735697/assignments/4191897"
    );

    let by_id = course.get_assignment(Some("42".into()), None).unwrap();
    assert_eq!(by_id.id().as_str(), "42");

    assert!(matches!(
        course.get_assignment(None, None),
        Err(Error::InvalidArgument(_))
    ));
}
