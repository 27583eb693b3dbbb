use crate::model::BackupProgress;

/// Sink for backup notifications.
///
/// `notify` carries start/finish status lines; `progress` carries thresholded
/// progress snapshots. The CLI implements this with indicatif bars; delivery
/// (desktop banner, log line) is irrelevant to the core. Both methods default
/// to no-ops.
pub trait BackupNotifier: Send + Sync {
    fn notify(&self, _title: &str, _message: &str) {}
    fn progress(&self, _label: &str, _progress: &BackupProgress) {}
}

/// No-op notifier for silent operation.
pub struct SilentNotifier;

impl BackupNotifier for SilentNotifier {}
