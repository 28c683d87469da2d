//! Pluggable storage backends for saved TTML files.
//!
//! The crate ships with [`FsStorage`], which writes to the local filesystem.
//! Implement the [`Storage`] trait to add your own backend.

mod fs;

pub use fs::FsStorage;

use crate::error::Result;

use std::future::Future;

/// MIME type of every saved document.
pub const TTML_CONTENT_TYPE: &str = "application/xml";

/// Trait for storage backends that can persist saved documents.
///
/// Implementations must be `Send + Sync + 'static` so they can be used from
/// the background save worker.
///
/// # Implementing a custom backend
///
/// ```rust,no_run
/// use ttml_capture::{Storage, Result};
///
/// struct MyStorage;
///
/// impl Storage for MyStorage {
///     async fn put(&self, key: &str, content: &[u8], content_type: &str) -> Result<()> {
///         // write content somewhere ...
///         Ok(())
///     }
/// }
/// ```
pub trait Storage: Send + Sync + 'static {
    /// Persist `content` under the given `key` with the specified MIME
    /// `content_type` ([`TTML_CONTENT_TYPE`] for everything this crate saves).
    fn put(
        &self,
        key: &str,
        content: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}
