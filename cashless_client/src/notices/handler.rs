use std::time::Duration;

use tokio::task::JoinHandle;

use super::dto::NoticeKind;

pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// One single-shot expiry timer per notice slot.
#[derive(Default)]
pub struct NoticeTimers {
    error: Option<JoinHandle<()>>,
    success: Option<JoinHandle<()>>,
}

impl NoticeTimers {
    fn slot(&mut self, kind: NoticeKind) -> &mut Option<JoinHandle<()>> {
        match kind {
            NoticeKind::Error => &mut self.error,
            NoticeKind::Success => &mut self.success,
        }
    }

    /// Installs the timer for `kind`, aborting the one it replaces.
    pub fn replace(&mut self, kind: NoticeKind, handle: JoinHandle<()>) {
        if let Some(previous) = self.slot(kind).replace(handle) {
            previous.abort();
        }
    }

    pub fn cancel(&mut self, kind: NoticeKind) {
        if let Some(handle) = self.slot(kind).take() {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel(NoticeKind::Error);
        self.cancel(NoticeKind::Success);
    }
}

impl Drop for NoticeTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
