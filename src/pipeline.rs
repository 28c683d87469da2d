//! The capture pipeline: payload in, stored (and optionally saved) TTML out.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::capture::{Capture, CaptureContext};
use crate::error::{Result, TtmlCaptureError};
use crate::filename::{FilenameDeriver, resolve_filename};
use crate::notify::Notifier;
use crate::scanner;
use crate::worker::TtmlFile;

/// How an intercepted body should be decoded, based on its content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyKind {
    /// Declared as JSON.
    Json,
    /// Plain text or opaque bytes that may still hold JSON.
    MaybeJson,
}

impl BodyKind {
    pub(crate) fn from_content_type(content_type: &str) -> Option<Self> {
        let ct = content_type.to_ascii_lowercase();
        if ct.contains("application/json") {
            Some(Self::Json)
        } else if ct.contains("text/plain") || ct.contains("application/octet-stream") {
            Some(Self::MaybeJson)
        } else {
            None
        }
    }
}

pub(crate) struct Pipeline {
    pub(crate) context: CaptureContext,
    pub(crate) filenames: FilenameDeriver,
    pub(crate) notifier: Arc<dyn Notifier>,
    saver: mpsc::Sender<TtmlFile>,
}

impl Pipeline {
    pub(crate) fn new(
        context: CaptureContext,
        filenames: FilenameDeriver,
        notifier: Arc<dyn Notifier>,
        saver: mpsc::Sender<TtmlFile>,
    ) -> Self {
        Self {
            context,
            filenames,
            notifier,
            saver,
        }
    }

    pub(crate) fn notify(&self, message: &str) {
        self.notifier.notify(message);
    }

    /// Queue a document for the save worker.
    pub(crate) fn save(&self, name: String, content: String) -> Result<()> {
        self.saver
            .try_send(TtmlFile { name, content })
            .map_err(|_| TtmlCaptureError::ChannelClosed)
    }

    /// Filename for `capture` under the current settings.
    pub(crate) fn filename_for(&self, capture: &Capture, custom_name: &str) -> String {
        resolve_filename(custom_name, || self.filenames.derive(capture.payload()))
    }

    /// Decode a response body and run it through [`process`](Self::process).
    ///
    /// Decode failures are logged and swallowed.
    pub(crate) fn process_body(&self, url: &str, kind: BodyKind, body: &[u8]) -> Option<Arc<Capture>> {
        let payload = match kind {
            BodyKind::Json => match serde_json::from_slice::<Value>(body) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::debug!("Skipping {url}: {}", TtmlCaptureError::Decode(e));
                    return None;
                }
            },
            BodyKind::MaybeJson => {
                let text = String::from_utf8_lossy(body);
                match serde_json::from_str::<Value>(&text) {
                    Ok(payload) => payload,
                    Err(_) => {
                        tracing::trace!("Body of {url} is not JSON, ignoring");
                        return None;
                    }
                }
            }
        };
        self.process(payload)
    }

    /// Extract, record, and (when auto-download is on) save a document.
    ///
    /// Returns `None` and leaves the state untouched when the payload holds
    /// no TTML.
    pub(crate) fn process(&self, payload: Value) -> Option<Arc<Capture>> {
        let Some(document) = scanner::extract_document(&payload) else {
            tracing::debug!("No TTML document in payload");
            return None;
        };

        let settings = self.context.settings();
        let capture = self.context.store(document, payload, settings.beautify);
        tracing::info!(
            sequence = capture.sequence(),
            bytes = capture.document().len(),
            "Captured TTML document"
        );

        if settings.auto_download {
            let name = self.filename_for(&capture, &settings.custom_name);
            let content = capture.content(settings.beautify).to_string();
            match self.save(name.clone(), content) {
                Ok(()) => self.notify(&format!("TTML downloaded: {name}")),
                Err(e) => {
                    tracing::error!("Failed to queue {name}: {e}");
                    self.notify(&format!("Failed to save {name}"));
                }
            }
        } else {
            self.notify("TTML captured (use download to save it)");
        }

        self.context.publish(capture.sequence());
        Some(capture)
    }
}
