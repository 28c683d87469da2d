//! Shared capture state: user settings plus the most recent capture.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde_json::Value;
use tokio::sync::watch;

use crate::config::Settings;
use crate::pretty::pretty_print;

/// One successful run of the extraction pipeline.
///
/// The formatted rendering is derived from the original document on first
/// use (or eagerly when beautify was on at capture time) and then cached.
#[derive(Debug)]
pub struct Capture {
    sequence: u64,
    document: String,
    formatted: OnceLock<String>,
    payload: Value,
}

impl Capture {
    /// Position of this capture in completion order, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The TTML document exactly as extracted from the payload.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// The pretty-printed document.
    pub fn formatted(&self) -> &str {
        self.formatted.get_or_init(|| pretty_print(&self.document))
    }

    /// The text to save or copy for the given beautify setting.
    pub fn content(&self, beautify: bool) -> &str {
        if beautify {
            self.formatted()
        } else {
            self.document()
        }
    }

    /// The decoded response body the document was found in.
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

#[derive(Default)]
struct Slot {
    sequence: u64,
    latest: Option<Arc<Capture>>,
}

struct Shared {
    settings: RwLock<Settings>,
    slot: RwLock<Slot>,
    updates: watch::Sender<u64>,
}

/// Cloneable handle to the capture state.
///
/// Every clone sees the same settings and the same latest capture. Captures
/// are numbered in the order they are recorded and the last one recorded
/// replaces whatever was there before.
#[derive(Clone)]
pub struct CaptureContext {
    shared: Arc<Shared>,
}

impl CaptureContext {
    pub fn new(settings: Settings) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                settings: RwLock::new(settings),
                slot: RwLock::new(Slot::default()),
                updates,
            }),
        }
    }

    /// A copy of the current settings.
    pub fn settings(&self) -> Settings {
        self.shared
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Modify the settings in place.
    pub fn update_settings(&self, f: impl FnOnce(&mut Settings)) {
        f(&mut self
            .shared
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner));
    }

    /// The most recent capture, if any.
    pub fn latest(&self) -> Option<Arc<Capture>> {
        self.shared
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .clone()
    }

    /// Sequence number of the most recent capture, `0` before the first one.
    pub fn sequence(&self) -> u64 {
        self.shared
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sequence
    }

    /// Watch the sequence number of the most recent capture.
    ///
    /// Captures made by the interceptor are published once they are fully
    /// handled, that is after any auto-download has been queued. The
    /// watched value never goes backwards.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.updates.subscribe()
    }

    /// Store a new capture, replacing the previous one, and publish it.
    ///
    /// When `beautify` is set the formatted rendering is produced up front,
    /// outside the lock.
    pub fn record(&self, document: String, payload: Value, beautify: bool) -> Arc<Capture> {
        let capture = self.store(document, payload, beautify);
        self.publish(capture.sequence);
        capture
    }

    /// Notify subscribers that capture `sequence` is complete.
    pub(crate) fn publish(&self, sequence: u64) {
        self.shared.updates.send_if_modified(|current| {
            if sequence > *current {
                *current = sequence;
                true
            } else {
                false
            }
        });
    }

    /// Store a new capture without publishing it.
    pub(crate) fn store(&self, document: String, payload: Value, beautify: bool) -> Arc<Capture> {
        let formatted = if beautify {
            OnceLock::from(pretty_print(&document))
        } else {
            OnceLock::new()
        };

        let capture = {
            let mut slot = self
                .shared
                .slot
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            slot.sequence += 1;
            let capture = Arc::new(Capture {
                sequence: slot.sequence,
                document,
                formatted,
                payload,
            });
            slot.latest = Some(Arc::clone(&capture));
            capture
        };
        capture
    }
}

impl Default for CaptureContext {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
