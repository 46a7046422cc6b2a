//! Scheduled events owned by a quiz session.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// A running background schedule. The task is aborted when the handle is
/// cancelled or dropped, so a handle never outlives its owner.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Send `make()` every `period`, first after one full period.
    pub fn every<E, F>(period: Duration, sink: UnboundedSender<E>, make: F) -> Self
    where
        E: Send + 'static,
        F: Fn() -> E + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if sink.send(make()).is_err() {
                    break;
                }
            }
        });
        Self { task }
    }

    /// Send `event` once after `delay`.
    pub fn after<E>(delay: Duration, sink: UnboundedSender<E>, event: E) -> Self
    where
        E: Send + 'static,
    {
        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = sink.send(event);
        });
        Self { task }
    }

    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
