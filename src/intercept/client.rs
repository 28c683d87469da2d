//! HTTP client abstraction with an intercepting middleware wrapper.

use std::borrow::Cow;
use std::future::Future;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{StatusCode, Url};

use super::Interceptor;
use crate::error::Result;

/// A fully buffered HTTP response.
///
/// Cloning is cheap: the body is reference counted, so the interceptor can
/// inspect a copy while the caller keeps the original.
#[derive(Debug, Clone)]
pub struct Response {
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    pub fn new(url: Url, status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            url,
            status,
            headers,
            body: body.into(),
        }
    }

    /// Buffer a [`reqwest::Response`] body.
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self::new(url, status, headers, body))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `Content-Type` header, if present and valid text.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// A promise-style HTTP client: one request in, one buffered response out.
pub trait HttpClient: Send + Sync + 'static {
    fn execute(&self, request: reqwest::Request) -> impl Future<Output = Result<Response>> + Send;
}

impl HttpClient for reqwest::Client {
    async fn execute(&self, request: reqwest::Request) -> Result<Response> {
        let response = reqwest::Client::execute(self, request).await?;
        Response::from_reqwest(response).await
    }
}

/// Middleware that hands a copy of every matching response to an
/// [`Interceptor`] and returns the original to the caller untouched.
///
/// # Example
///
/// ```rust,no_run
/// use ttml_capture::{HttpClient, TtmlCaptureBuilder, FsStorage};
///
/// # async fn example() -> ttml_capture::Result<()> {
/// let handle = TtmlCaptureBuilder::new(FsStorage::new("/tmp/lyrics")).build();
/// let client = handle.interceptor().wrap(reqwest::Client::new());
///
/// let url = "https://amp-api.music.apple.com/v1/catalog/us/songs/1/syllable-lyrics";
/// let request = reqwest::Request::new(reqwest::Method::GET, url.parse().unwrap());
/// let response = client.execute(request).await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
pub struct InterceptingClient<C> {
    inner: C,
    interceptor: Interceptor,
}

impl<C: HttpClient> InterceptingClient<C> {
    pub fn new(inner: C, interceptor: Interceptor) -> Self {
        Self { inner, interceptor }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: HttpClient> HttpClient for InterceptingClient<C> {
    async fn execute(&self, request: reqwest::Request) -> Result<Response> {
        let url = request.url().to_string();
        let response = self.inner.execute(request).await?;
        self.interceptor
            .observe(&url, response.content_type(), response.body());
        Ok(response)
    }
}
