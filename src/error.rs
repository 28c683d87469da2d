//! Error types for the `ttml_capture` crate.

/// All errors that can occur while capturing, formatting, and saving TTML.
#[derive(Debug, thiserror::Error)]
pub enum TtmlCaptureError {
    /// A storage backend failed to persist content.
    #[error("Storage upload failed: {0}")]
    StorageUpload(Box<dyn std::error::Error + Send + Sync>),

    /// The internal channel to the background save worker is closed or full.
    #[error("Channel closed or full")]
    ChannelClosed,

    /// The wrapped HTTP client failed to complete a request.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be decoded as JSON.
    #[error("Invalid JSON payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A document is not well-formed XML.
    #[error("Malformed XML: {0}")]
    Xml(String),

    /// Writing to the clipboard failed.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// A save or copy was requested before anything was captured.
    #[error("No TTML document has been captured yet")]
    NothingCaptured,

    /// The builder configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),
}

/// A type alias for `Result<T, TtmlCaptureError>`.
pub type Result<T> = std::result::Result<T, TtmlCaptureError>;
