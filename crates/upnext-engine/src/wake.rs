//! The wake-up seam.
//!
//! A [`WakeTimer`] is the primitive that re-invokes the pipeline at a future
//! instant. The engine only computes deadlines; registering and firing them
//! belongs to the host. Registering a new deadline always replaces the
//! pending one, deadlines never stack.
//!
//! [`TokioWakeTimer`] is a ready-made implementation for hosts that live
//! inside a tokio runtime and have no OS alarm service to lean on.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Registry for the single future instant at which the pipeline must run
/// again.
pub trait WakeTimer: Send + Sync {
    /// Registers `at` as the next wake instant, replacing any pending
    /// deadline. Instants in the past fire immediately.
    fn schedule(&self, at: DateTime<Utc>);
}

impl<T: WakeTimer + ?Sized> WakeTimer for Arc<T> {
    fn schedule(&self, at: DateTime<Utc>) {
        (**self).schedule(at);
    }
}

/// A [`WakeTimer`] backed by a tokio sleep task.
///
/// Each `schedule` call aborts the previously spawned task and spawns a new
/// one that sends the deadline on a channel once it is reached. The receiver
/// half is handed out at construction; the host listens on it and triggers
/// the next refresh.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioWakeTimer {
    tx: mpsc::UnboundedSender<DateTime<Utc>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl TokioWakeTimer {
    /// Creates a timer and the receiver on which wake instants are
    /// delivered.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DateTime<Utc>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                pending: Mutex::new(None),
            },
            rx,
        )
    }
}

impl WakeTimer for TokioWakeTimer {
    fn schedule(&self, at: DateTime<Utc>) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            debug!("replacing pending wake deadline");
            previous.abort();
        }

        let tx = self.tx.clone();
        *pending = Some(tokio::spawn(async move {
            // Deadlines already in the past collapse to zero delay.
            let delay = (at - Utc::now()).to_std().unwrap_or(std::time::Duration::ZERO);
            tokio::time::sleep(delay).await;
            let _ = tx.send(at);
        }));
    }
}

impl Drop for TokioWakeTimer {
    fn drop(&mut self) {
        if let Some(pending) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test(start_paused = true)]
    async fn scheduled_deadline_fires() {
        let (timer, mut rx) = TokioWakeTimer::new();
        let deadline = Utc::now() + Duration::seconds(5);

        timer.schedule(deadline);

        assert_eq!(rx.recv().await, Some(deadline));
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_the_pending_deadline() {
        let (timer, mut rx) = TokioWakeTimer::new();
        let far = Utc::now() + Duration::hours(1);
        let near = Utc::now() + Duration::seconds(1);

        timer.schedule(far);
        timer.schedule(near);

        // Only the replacement fires; the first task was aborted.
        assert_eq!(rx.recv().await, Some(near));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn past_deadline_fires_immediately() {
        let (timer, mut rx) = TokioWakeTimer::new();
        let past = Utc::now() - Duration::minutes(10);

        timer.schedule(past);

        assert_eq!(rx.recv().await, Some(past));
    }
}
