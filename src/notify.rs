//! Short user-facing status messages ("TTML downloaded: ...").

/// Sink for transient notifications shown to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Default notifier that logs each message at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("{message}");
    }
}
