//! The handle returned by the builder: interception, manual save and copy,
//! and worker lifecycle.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::capture::{Capture, CaptureContext};
use crate::clipboard::Clipboard;
use crate::error::{Result, TtmlCaptureError};
use crate::intercept::{HttpClient, InterceptingClient, Interceptor};
use crate::pipeline::Pipeline;

/// Primary handle returned by [`TtmlCaptureBuilder::build`](crate::TtmlCaptureBuilder::build).
///
/// Owns the shutdown signal and the save worker's join handle. Use
/// [`interceptor`](Self::interceptor) or [`wrap`](Self::wrap) to start
/// observing traffic, [`download`](Self::download) and
/// [`copy_to_clipboard`](Self::copy_to_clipboard) for the manual actions, and
/// [`shutdown`](Self::shutdown) to flush pending saves.
pub struct TtmlCaptureHandle {
    pipeline: Arc<Pipeline>,
    interceptor: Interceptor,
    clipboard: Box<dyn Clipboard>,
    shutdown: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl TtmlCaptureHandle {
    pub(crate) fn new(
        pipeline: Arc<Pipeline>,
        interceptor: Interceptor,
        clipboard: Box<dyn Clipboard>,
        shutdown: oneshot::Sender<()>,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            pipeline,
            interceptor,
            clipboard,
            shutdown: Some(shutdown),
            worker: Some(worker),
        }
    }

    /// The shared capture state and settings.
    pub fn context(&self) -> &CaptureContext {
        &self.pipeline.context
    }

    /// A cloneable interceptor feeding this session.
    pub fn interceptor(&self) -> Interceptor {
        self.interceptor.clone()
    }

    /// Wrap a promise-style client so its lyrics responses are captured.
    pub fn wrap<C: HttpClient>(&self, client: C) -> InterceptingClient<C> {
        self.interceptor.wrap(client)
    }

    fn latest_or_notify(&self) -> Result<Arc<Capture>> {
        self.context().latest().ok_or_else(|| {
            self.pipeline.notify("No TTML captured yet");
            TtmlCaptureError::NothingCaptured
        })
    }

    /// Save the most recent capture, returning the filename used.
    ///
    /// The filename is resolved now: the custom name if set, otherwise
    /// derived from current now-playing info and the capture's payload.
    pub fn download(&self) -> Result<String> {
        let capture = self.latest_or_notify()?;
        let settings = self.context().settings();
        let name = self.pipeline.filename_for(&capture, &settings.custom_name);
        let content = capture.content(settings.beautify).to_string();

        if let Err(e) = self.pipeline.save(name.clone(), content) {
            tracing::error!("Failed to queue {name}: {e}");
            self.pipeline.notify(&format!("Failed to save {name}"));
            return Err(e);
        }
        self.pipeline.notify(&format!("TTML downloaded: {name}"));
        Ok(name)
    }

    /// Copy the most recent capture to the clipboard.
    ///
    /// The user is notified of both success and failure.
    pub fn copy_to_clipboard(&self) -> Result<()> {
        let capture = self.latest_or_notify()?;
        let beautify = self.context().settings().beautify;

        match self.clipboard.set_text(capture.content(beautify)) {
            Ok(()) => {
                self.pipeline.notify("TTML copied to clipboard");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Clipboard write failed: {e}");
                self.pipeline.notify("Failed to copy TTML");
                Err(e)
            }
        }
    }

    /// Gracefully shut down the save worker.
    ///
    /// Sends a shutdown signal, waits for the worker to write every queued
    /// file, then returns. Interceptors keep capturing into the context, but
    /// nothing is saved afterwards.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.await;
        }
    }
}
