//! Observing HTTP responses and feeding lyrics payloads into the pipeline.
//!
//! Two kinds of client are supported:
//!
//! - promise-style clients implementing [`HttpClient`], wrapped with
//!   [`Interceptor::wrap`] into an [`InterceptingClient`];
//! - event-style clients that report finished loads as [`LoadEvent`]s to
//!   [`Interceptor::on_load`].
//!
//! Either way the response the caller sees is never modified. Inside a tokio
//! runtime the pipeline runs on the blocking pool, detached from the request
//! that triggered it; without one it runs on the calling thread.

mod client;

pub use client::{HttpClient, InterceptingClient, Response};

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use regex::Regex;

use crate::pipeline::{BodyKind, Pipeline};

/// URL pattern that marks a response as a lyrics response.
pub const DEFAULT_URL_PATTERN: &str = r"(?i)syllable-lyrics|lyrics";

/// Anything a request URL can be read from.
pub trait RequestTarget {
    fn target_url(&self) -> Cow<'_, str>;
}

impl RequestTarget for str {
    fn target_url(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl RequestTarget for String {
    fn target_url(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl RequestTarget for reqwest::Url {
    fn target_url(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl RequestTarget for reqwest::Request {
    fn target_url(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.url().as_str())
    }
}

/// A completed load reported by an event-style client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadEvent {
    /// The URL the request was opened with.
    pub url: String,
    /// The response `Content-Type` header, if any.
    pub content_type: Option<String>,
    pub response_text: String,
}

/// Decides which responses to inspect and dispatches them to the pipeline.
///
/// Cheap to clone; all clones feed the same capture state.
#[derive(Clone)]
pub struct Interceptor {
    pattern: Regex,
    pipeline: Arc<Pipeline>,
}

impl Interceptor {
    pub(crate) fn new(pattern: Regex, pipeline: Arc<Pipeline>) -> Self {
        Self { pattern, pipeline }
    }

    /// Returns `true` if responses for `target` should be inspected.
    pub fn matches<T: RequestTarget + ?Sized>(&self, target: &T) -> bool {
        self.pattern.is_match(&target.target_url())
    }

    /// Wrap a promise-style client so its responses are inspected.
    pub fn wrap<C: HttpClient>(&self, client: C) -> InterceptingClient<C> {
        InterceptingClient::new(client, self.clone())
    }

    /// Inspect a finished load from an event-style client.
    pub fn on_load(&self, event: &LoadEvent) {
        if !self.matches(event.url.as_str()) {
            return;
        }
        self.dispatch(
            &event.url,
            event.content_type.as_deref(),
            Bytes::copy_from_slice(event.response_text.as_bytes()),
        );
    }

    /// Turn this interceptor into a load listener closure.
    pub fn into_load_listener(self) -> impl Fn(&LoadEvent) + Send + Sync + 'static {
        move |event: &LoadEvent| self.on_load(event)
    }

    /// Inspect a response body without consuming the caller's copy.
    pub fn observe(&self, url: &str, content_type: Option<&str>, body: &Bytes) {
        if !self.matches(url) {
            return;
        }
        self.dispatch(url, content_type, body.clone());
    }

    fn dispatch(&self, url: &str, content_type: Option<&str>, body: Bytes) {
        let Some(kind) = content_type.and_then(BodyKind::from_content_type) else {
            tracing::debug!("Ignoring {url}: unsupported content type {content_type:?}");
            return;
        };

        let pipeline = Arc::clone(&self.pipeline);
        let target = url.to_string();
        let job = move || {
            pipeline.process_body(&target, kind, &body);
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(job);
            }
            Err(_) => {
                tracing::debug!("No tokio runtime, processing {url} on the calling thread");
                job();
            }
        }
    }
}
