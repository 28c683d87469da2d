//! Background worker that writes saved documents to storage.
//!
//! This module is internal -- users interact with it indirectly through
//! [`TtmlCaptureHandle`](crate::TtmlCaptureHandle).

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::notify::Notifier;
use crate::storage::{Storage, TTML_CONTENT_TYPE};

/// A document queued for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TtmlFile {
    pub(crate) name: String,
    pub(crate) content: String,
}

pub(crate) async fn run<S: Storage>(
    mut rx: mpsc::Receiver<TtmlFile>,
    mut shutdown_rx: oneshot::Receiver<()>,
    storage: S,
    prefix: String,
    notifier: Arc<dyn Notifier>,
) {
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => {
                tracing::info!("Shutdown signal received, draining save queue");
                rx.close();
                let mut pending = Vec::new();
                while let Some(file) = rx.recv().await {
                    pending.push(file);
                }
                let count = pending.len();
                let writes = pending
                    .iter()
                    .map(|file| write(&storage, &prefix, file, notifier.as_ref()));
                futures::future::join_all(writes).await;
                tracing::info!("Save worker shut down after flushing {count} files");
                return;
            }

            file = rx.recv() => match file {
                Some(file) => write(&storage, &prefix, &file, notifier.as_ref()).await,
                None => {
                    tracing::debug!("All save senders dropped, stopping worker");
                    return;
                }
            },
        }
    }
}

async fn write<S: Storage>(storage: &S, prefix: &str, file: &TtmlFile, notifier: &dyn Notifier) {
    let key = if prefix.is_empty() {
        file.name.clone()
    } else {
        format!("{}/{}", prefix, file.name)
    };

    match storage
        .put(&key, file.content.as_bytes(), TTML_CONTENT_TYPE)
        .await
    {
        Ok(()) => tracing::debug!("Saved {key}"),
        Err(e) => {
            tracing::error!("Failed to save {key}: {e}");
            notifier.notify(&format!("Failed to save {}", file.name));
        }
    }
}
