//! Clipboard sinks for copying a captured document.

use crate::error::{Result, TtmlCaptureError};

/// Something that can receive plain text, typically the system clipboard.
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;
}

/// The system clipboard (requires the `clipboard` feature).
///
/// A fresh [`arboard::Clipboard`] is opened for every copy, so nothing is
/// held between calls.
#[cfg(feature = "clipboard")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        arboard::Clipboard::new()
            .and_then(|mut cb| cb.set_text(text.to_owned()))
            .map_err(|e| TtmlCaptureError::Clipboard(e.to_string()))
    }
}

/// Clipboard that rejects every copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn set_text(&self, _text: &str) -> Result<()> {
        Err(TtmlCaptureError::Clipboard("no clipboard available".into()))
    }
}

/// The clipboard used when the builder is not given one.
pub(crate) fn default_clipboard() -> Box<dyn Clipboard> {
    #[cfg(feature = "clipboard")]
    {
        Box::new(SystemClipboard)
    }
    #[cfg(not(feature = "clipboard"))]
    {
        Box::new(NoClipboard)
    }
}
