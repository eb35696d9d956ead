use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::course::{Course, CourseId};
use crate::creds::Creds;
use crate::error::{Error, Result};
use crate::token::{TokenLocator, extract_token};
use crate::transport::{GsResponse, HttpTransport, REQUEST_TIMEOUT, RequestBody, Transport};
use crate::util::{BASE_URL, LOGIN_PATH, gs_url, id_from_url};

/// A Gradescope session. `Client<Init>` holds the credentials and nothing else can be done with it
/// but [`Client::setup`]; the resulting `Client<Auth>` is the logged-in session, which can be
/// cloned freely and handed to courses.
#[derive(Debug)]
pub struct Client<State: ClientState> {
    base_url: Url,
    session: Arc<Session>,
    state: State,
}

/// What every clone of a client shares. Shutdown cancels `closed` and empties the transport slot,
/// so the connection pool and cookie jar go away even while courses still hold the client.
#[derive(Debug)]
struct Session {
    transport: RwLock<Option<Arc<dyn Transport>>>,
    closed: CancellationToken,
}

impl Session {
    fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: RwLock::new(Some(transport)),
            closed: CancellationToken::new(),
        }
    }

    /// The lock is only held to clone or take the handle, never across a request.
    fn transport(&self) -> Result<Arc<dyn Transport>> {
        self.transport
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(Error::closed)
    }

    fn close(&self) {
        self.closed.cancel();
        let transport = self
            .transport
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(transport);
    }
}

impl<State: ClientState> Client<State> {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        gs_url(&self.base_url, path)
    }

    /// Runs one network call, giving up when the session is shut down or the call takes too long.
    async fn guarded<T>(&self, target: &Url, call: impl Future<Output = Result<T>>) -> Result<T> {
        if self.session.closed.is_cancelled() {
            return Err(Error::closed());
        }

        tokio::select! {
            biased;
            () = self.session.closed.cancelled() => Err(Error::closed()),
            result = time::timeout(REQUEST_TIMEOUT, call) => result.unwrap_or_else(|_| {
                Err(Error::Timeout {
                    target: target.to_string(),
                    timeout: REQUEST_TIMEOUT,
                })
            }),
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &Url) -> Result<GsResponse> {
        let transport = self.session.transport()?;
        info!(%url, "GET");
        self.guarded(url, transport.get(url)).await
    }

    async fn fetch_page(&self, url: &Url, context: &'static str) -> Result<String> {
        let response = self.fetch(url).await?;
        if !response.ok() {
            return Err(Error::request(context, &response));
        }
        Ok(response.text().into_owned())
    }

    async fn fetch_token(&self, url: &Url, locator: &TokenLocator) -> Result<String> {
        let page = self
            .fetch_page(url, "could not load page for a token")
            .await?;
        extract_token(&page, locator)
    }

    async fn submit(&self, submission: FormSubmission) -> Result<GsResponse> {
        if !submission.attachments.is_empty() {
            return Err(Error::Unsupported("file uploads"));
        }

        let referer = submission.referer.as_ref().unwrap_or(&submission.url);
        let headers = self.form_headers(referer, submission.csrf_token.as_deref())?;

        let transport = self.session.transport()?;
        info!(url = %submission.url, "POST");
        self.guarded(
            &submission.url,
            transport.post(&submission.url, headers, submission.body.clone()),
        )
        .await
    }

    fn form_headers(&self, referer: &Url, csrf_token: Option<&str>) -> Result<HeaderMap> {
        let host = match (self.base_url.host_str(), self.base_url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_owned(),
            (None, _) => {
                return Err(Error::InvalidArgument(format!(
                    "base URL `{}` has no host",
                    self.base_url
                )));
            }
        };
        let origin = self.base_url.origin().ascii_serialization();

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "host", &host)?;
        insert_header(&mut headers, "origin", &origin)?;
        insert_header(&mut headers, "referer", referer.as_str())?;
        if let Some(csrf_token) = csrf_token {
            insert_header(&mut headers, "x-csrf-token", csrf_token)?;
        }
        Ok(headers)
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|_| Error::InvalidArgument(format!("`{value}` is not a valid `{name}` header")))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

impl Client<Init> {
    pub fn new(creds: Creds) -> Result<Self> {
        let base_url = Url::parse(BASE_URL).map_err(|source| Error::InvalidUrl {
            url: BASE_URL.to_owned(),
            source,
        })?;
        Self::with_base_url(creds, base_url)
    }

    pub fn with_base_url(creds: Creds, base_url: Url) -> Result<Self> {
        let transport = HttpTransport::new(&base_url)?;
        Ok(Self::with_transport(creds, base_url, Arc::new(transport)))
    }

    pub fn with_transport(creds: Creds, base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            session: Arc::new(Session::new(transport)),
            state: Init { creds },
        }
    }

    /// Logs in. The credentials are dropped once this succeeds; on failure the whole unauthenticated
    /// client is dropped with them.
    #[tracing::instrument(skip(self), fields(email = %self.state.creds.email()), err)]
    pub async fn setup(self) -> Result<Client<Auth>> {
        let login_url = self.url(LOGIN_PATH)?;

        debug!("authenticating");
        let authenticity_token = self
            .fetch_token(&login_url, &TokenLocator::FirstForm)
            .await?;

        let login_data = login_form(&self.state.creds, &authenticity_token);
        let response = self
            .submit(FormSubmission::new(login_url).with_form(login_data))
            .await?;
        check_login_success(&response)?;
        info!("logged in");

        let Client {
            base_url,
            session,
            state: Init { creds },
        } = self;
        drop(creds);

        Ok(Client {
            base_url,
            session,
            state: Auth,
        })
    }
}

fn login_form(creds: &Creds, authenticity_token: &str) -> Vec<(String, String)> {
    [
        ("utf8", "✓"),
        ("authenticity_token", authenticity_token),
        ("session[email]", creds.email()),
        ("session[password]", creds.password()),
        ("session[remember_me]", "1"),
        ("commit", "Log In"),
        ("session[remember_me_sso]", "0"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_owned(), value.to_owned()))
    .collect()
}

fn check_login_success(response: &GsResponse) -> Result<()> {
    let status = response.status();

    if status.is_redirection() {
        return Ok(());
    }

    if status.is_success() {
        // a rejected login re-renders the login form
        let login_form = TokenLocator::FormAction(LOGIN_PATH.to_owned());
        return match extract_token(&response.text(), &login_form) {
            Ok(_) => Err(Error::Auth {
                reason: "credentials were rejected".to_owned(),
            }),
            Err(_) => Ok(()),
        };
    }

    Err(Error::Auth {
        reason: format!("{} responded with status {status}", response.url()),
    })
}

impl Client<Auth> {
    pub fn course(&self, id: CourseId) -> Course {
        Course::new(self.clone(), id)
    }

    /// Course for a URL like `https://www.gradescope.com/courses/735697/`.
    pub fn course_from_url(&self, course_url: &str) -> Result<Course> {
        let id = id_from_url(course_url, "courses")?;
        Ok(self.course(CourseId::new(id)))
    }

    /// Fetches `url` and pulls a fresh anti-forgery token out of it.
    #[tracing::instrument(skip(self), err)]
    pub async fn token(&self, url: &Url, locator: &TokenLocator) -> Result<String> {
        self.fetch_token(url, locator).await
    }

    /// Posts a form the way the site's own pages do. The response is returned whatever its status.
    pub async fn submit_form(&self, submission: FormSubmission) -> Result<GsResponse> {
        self.submit(submission).await
    }

    pub(crate) async fn get_html(&self, url: &Url, context: &'static str) -> Result<String> {
        self.fetch_page(url, context).await
    }

    /// Closes the session and releases the transport. Every handle derived from it fails with
    /// [`Error::InvalidState`] from now on, including calls that are already waiting on the network.
    pub fn shutdown(self) {
        self.session.close();
        info!("session shut down");
    }

    pub fn is_closed(&self) -> bool {
        self.session.closed.is_cancelled()
    }
}

impl Clone for Client<Auth> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            session: Arc::clone(&self.session),
            state: Auth,
        }
    }
}

#[derive(Debug)]
pub struct Init {
    creds: Creds,
}
#[derive(Debug, Clone, Copy)]
pub struct Auth;

pub trait ClientState {}
impl ClientState for Init {}
impl ClientState for Auth {}

/// A POST to one of the site's form endpoints.
#[derive(Debug, Clone)]
pub struct FormSubmission {
    url: Url,
    referer: Option<Url>,
    body: RequestBody,
    csrf_token: Option<String>,
    attachments: Vec<Attachment>,
}

impl FormSubmission {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            referer: None,
            body: RequestBody::Empty,
            csrf_token: None,
            attachments: Vec::new(),
        }
    }

    /// Defaults to the submission URL itself.
    pub fn with_referer(mut self, referer: Url) -> Self {
        self.referer = Some(referer);
        self
    }

    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    pub fn with_json(mut self, json: Value) -> Self {
        self.body = RequestBody::Json(json);
        self
    }

    pub fn with_csrf_token(mut self, csrf_token: String) -> Self {
        self.csrf_token = Some(csrf_token);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub field: String,
    pub file_name: String,
    pub content: Vec<u8>,
}
