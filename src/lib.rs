//! # ttml_capture
//!
//! Capture TTML lyrics documents from HTTP traffic, pretty-print them, and
//! save them under a readable filename.
//!
//! ## Overview
//!
//! An [`Interceptor`] watches responses whose URL looks like a lyrics
//! endpoint. Each matching body is decoded as JSON and searched for a
//! `<tt ...>` document, which is recorded in a shared [`CaptureContext`].
//! With auto-download on, the document is (optionally) indented by
//! [`pretty_print`], named by [`derive_filename`], and handed to a background
//! worker that writes it to a [`Storage`] backend.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ttml_capture::{FsStorage, HttpClient, TtmlCaptureBuilder};
//!
//! # async fn example() -> ttml_capture::Result<()> {
//! let handle = TtmlCaptureBuilder::new(FsStorage::new("/tmp/lyrics")).build();
//! let client = handle.wrap(reqwest::Client::new());
//!
//! let url = "https://amp-api.music.apple.com/v1/catalog/us/songs/1/syllable-lyrics";
//! let request = reqwest::Request::new(reqwest::Method::GET, url.parse().unwrap());
//! let _response = client.execute(request).await?;
//!
//! // On shutdown, flush queued saves:
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `clipboard` | **yes** | Enables [`SystemClipboard`] via `arboard`. |

pub mod capture;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod filename;
pub mod handle;
pub mod intercept;
pub mod notify;
pub mod now_playing;
mod pipeline;
pub mod pretty;
pub mod scanner;
pub mod storage;
mod worker;

pub use capture::{Capture, CaptureContext};
#[cfg(feature = "clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{Clipboard, NoClipboard};
pub use config::{Settings, TtmlCaptureBuilder};
pub use error::{Result, TtmlCaptureError};
pub use filename::{FilenameDeriver, derive_filename, resolve_filename, sanitize};
pub use handle::TtmlCaptureHandle;
pub use intercept::{
    DEFAULT_URL_PATTERN, HttpClient, InterceptingClient, Interceptor, LoadEvent, RequestTarget,
    Response,
};
pub use notify::{Notifier, TracingNotifier};
pub use now_playing::{
    DomHeuristics, MediaItem, MediaSession, NowPlaying, NowPlayingChain, NowPlayingProvider,
    PageSnapshot,
};
pub use pretty::pretty_print;
pub use scanner::{extract_document, find_document};
pub use storage::{FsStorage, Storage};
