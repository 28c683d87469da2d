//! User settings and the builder that wires up a capture session.

use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::capture::CaptureContext;
use crate::clipboard::{self, Clipboard};
use crate::error::{Result, TtmlCaptureError};
use crate::filename::FilenameDeriver;
use crate::handle::TtmlCaptureHandle;
use crate::intercept::{DEFAULT_URL_PATTERN, Interceptor};
use crate::notify::{Notifier, TracingNotifier};
use crate::now_playing::{NowPlayingChain, NowPlayingProvider};
use crate::pipeline::Pipeline;
use crate::storage::Storage;
use crate::worker;

/// User-controlled settings, read fresh on every capture, save, and copy.
///
/// Serialized in camelCase (`autoDownload`, `beautify`, `customName`);
/// missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Save every capture as soon as it happens.
    pub auto_download: bool,
    /// Pretty-print documents before saving or copying.
    pub beautify: bool,
    /// Filename to use instead of the derived one; blank means derive.
    pub custom_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_download: true,
            beautify: true,
            custom_name: String::new(),
        }
    }
}

/// Builder for configuring and starting a [`TtmlCaptureHandle`].
///
/// # Example
///
/// ```rust,no_run
/// use ttml_capture::{FsStorage, MediaSession, Settings, TtmlCaptureBuilder};
///
/// # async fn example() -> ttml_capture::Result<()> {
/// let session = MediaSession::new();
/// let handle = TtmlCaptureBuilder::new(FsStorage::new("/tmp/lyrics"))
///     .settings(Settings { beautify: false, ..Settings::default() })
///     .url_pattern(r"(?i)/syllable-lyrics")?
///     .now_playing(session.clone())
///     .prefix("apple-music")
///     .build();
/// # Ok(())
/// # }
/// ```
pub struct TtmlCaptureBuilder<S: Storage> {
    storage: S,
    settings: Settings,
    url_pattern: Regex,
    providers: NowPlayingChain,
    clipboard: Box<dyn Clipboard>,
    notifier: Arc<dyn Notifier>,
    channel_buffer: usize,
    prefix: String,
}

impl<S: Storage> TtmlCaptureBuilder<S> {
    /// Create a new builder with the given storage backend and sensible defaults.
    ///
    /// Defaults: [`Settings::default`], [`DEFAULT_URL_PATTERN`], no
    /// now-playing providers, the system clipboard (when the `clipboard`
    /// feature is on), notifications logged via `tracing`, a save queue of
    /// 64 files, no prefix.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            settings: Settings::default(),
            url_pattern: Regex::new(DEFAULT_URL_PATTERN).expect("valid default URL pattern"),
            providers: NowPlayingChain::new(),
            clipboard: clipboard::default_clipboard(),
            notifier: Arc::new(TracingNotifier),
            channel_buffer: 64,
            prefix: String::new(),
        }
    }

    /// Initial settings; they can be changed later through the
    /// [`CaptureContext`].
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Regex a request URL must match for its response to be inspected.
    pub fn url_pattern(mut self, pattern: &str) -> Result<Self> {
        self.url_pattern = Regex::new(pattern)
            .map_err(|e| TtmlCaptureError::Config(format!("invalid URL pattern: {e}")))?;
        Ok(self)
    }

    /// Append a [`NowPlayingProvider`] used when deriving filenames.
    ///
    /// Providers are consulted in the order they are added.
    pub fn now_playing(mut self, provider: impl NowPlayingProvider + 'static) -> Self {
        self.providers.add(provider);
        self
    }

    pub fn clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Capacity of the queue between captures and the save worker.
    pub fn channel_buffer(mut self, size: usize) -> Self {
        self.channel_buffer = size;
        self
    }

    /// Set a prefix that is prepended to every saved file's key (separated by `/`).
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Consume the builder, spawn the save worker, and return the
    /// [`TtmlCaptureHandle`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> TtmlCaptureHandle {
        let (tx, rx) = tokio::sync::mpsc::channel(self.channel_buffer.max(1));
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let worker_handle = tokio::spawn(worker::run(
            rx,
            shutdown_rx,
            self.storage,
            self.prefix,
            Arc::clone(&self.notifier),
        ));

        let pipeline = Arc::new(Pipeline::new(
            CaptureContext::new(self.settings),
            FilenameDeriver::new(self.providers),
            self.notifier,
            tx,
        ));
        let interceptor = Interceptor::new(self.url_pattern, Arc::clone(&pipeline));

        TtmlCaptureHandle::new(
            pipeline,
            interceptor,
            self.clipboard,
            shutdown_tx,
            worker_handle,
        )
    }
}
