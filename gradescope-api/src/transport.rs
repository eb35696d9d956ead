//! The HTTP boundary. The rest of the crate only needs `get`, `post`, and a response it can
//! inspect; the cookie jar lives here.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

/// Fixed timeout applied to every request the client makes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const USER_AGENT: &str = "gradescope-api";

#[async_trait]
pub trait Transport: fmt::Debug + Send + Sync {
    async fn get(&self, url: &Url) -> Result<GsResponse>;

    async fn post(&self, url: &Url, headers: HeaderMap, body: RequestBody) -> Result<GsResponse>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Json(Value),
}

#[derive(Debug, Clone)]
pub struct GsResponse {
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl GsResponse {
    pub fn new(url: Url, status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url,
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Cookie-bearing `reqwest` transport. Redirects within the site are handed back to the caller
/// rather than followed, so a login redirect is visible as such.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    pub fn new(base_url: &Url) -> Result<Self> {
        let site_host = base_url.host_str().map(ToOwned::to_owned);
        let redirect_policy = Policy::custom(move |attempt| {
            if attempt.url().host_str() == site_host.as_deref() {
                Policy::none().redirect(attempt)
            } else {
                Policy::default().redirect(attempt)
            }
        });

        let client = HttpClient::builder()
            .cookie_store(true)
            .redirect(redirect_policy)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| Error::Transport {
                target: base_url.to_string(),
                source: source.into(),
            })?;

        Ok(Self { client })
    }

    async fn execute(&self, url: &Url, request: RequestBuilder) -> Result<GsResponse> {
        let transport_error = |source: reqwest::Error| {
            if source.is_timeout() {
                Error::Timeout {
                    target: url.to_string(),
                    timeout: REQUEST_TIMEOUT,
                }
            } else {
                Error::Transport {
                    target: url.to_string(),
                    source: source.into(),
                }
            }
        };

        let response = request.send().await.map_err(transport_error)?;
        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(GsResponse::new(final_url, status, headers, body.to_vec()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<GsResponse> {
        let request = self
            .client
            .get(url.clone())
            .header("Accept", "text/html");
        self.execute(url, request).await
    }

    async fn post(&self, url: &Url, headers: HeaderMap, body: RequestBody) -> Result<GsResponse> {
        let request = self.client.post(url.clone()).headers(headers);
        let request = match body {
            RequestBody::Empty => request,
            RequestBody::Form(fields) => request.form(&fields),
            RequestBody::Json(value) => request.json(&value),
        };
        self.execute(url, request).await
    }
}
