use std::sync::Arc;

use tokio::sync::watch;

/// Publishes the 0..=100 progress value the UI gauge polls each frame.
/// The remote strategy heartbeats toward 90 while the request is
/// outstanding and snaps to 100 on completion; the simulated strategy walks
/// to 100 in fixed steps.
#[derive(Clone)]
pub struct ProgressTracker {
    tx: Arc<watch::Sender<u8>>,
}

impl ProgressTracker {
    pub fn channel() -> (Self, watch::Receiver<u8>) {
        let (tx, rx) = watch::channel(0);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn set(&self, value: u8) {
        self.tx.send_replace(value.min(100));
    }

    /// Advance by `step` without exceeding `cap`.
    pub fn advance(&self, step: u8, cap: u8) {
        let current = *self.tx.borrow();
        if current < cap {
            self.tx.send_replace((current + step).min(cap));
        }
    }

    pub fn complete(&self) {
        self.tx.send_replace(100);
    }

    pub fn reset(&self) {
        self.tx.send_replace(0);
    }

    pub fn value(&self) -> u8 {
        *self.tx.borrow()
    }
}
