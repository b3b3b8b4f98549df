//! The hand-over point between the task that establishes a data connection and the command that
//! wants to use it.

use super::ConnectorError;
use crate::server::io::DataStream;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{sync::Notify, time::Instant};

enum Slot {
    Pending,
    Connected(DataStream),
    Taken,
    Closed(String),
}

pub(super) struct ReadyCell {
    slot: Mutex<Slot>,
    notify: Notify,
}

impl std::fmt::Debug for ReadyCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.lock() {
            Slot::Pending => "pending",
            Slot::Connected(_) => "connected",
            Slot::Taken => "taken",
            Slot::Closed(_) => "closed",
        };
        f.debug_struct("ReadyCell").field("state", &state).finish()
    }
}

impl ReadyCell {
    pub(super) fn new() -> Arc<ReadyCell> {
        Arc::new(ReadyCell {
            slot: Mutex::new(Slot::Pending),
            notify: Notify::new(),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Publishes the established stream. A cell that was closed in the meantime drops it.
    pub(super) fn connected(&self, stream: DataStream) {
        {
            let mut slot = self.lock();
            if matches!(*slot, Slot::Pending) {
                *slot = Slot::Connected(stream);
            }
        }
        self.notify.notify_one();
    }

    /// Marks the cell closed, dropping a stream nobody picked up.
    pub(super) fn close(&self, reason: &str) {
        {
            let mut slot = self.lock();
            if matches!(*slot, Slot::Pending | Slot::Connected(_)) {
                *slot = Slot::Closed(reason.to_string());
            }
        }
        self.notify.notify_one();
    }

    pub(super) fn is_connected(&self) -> bool {
        matches!(*self.lock(), Slot::Connected(_))
    }

    fn try_take(&self) -> Option<Result<DataStream, ConnectorError>> {
        let mut slot = self.lock();
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Connected(stream) => Some(Ok(stream)),
            Slot::Pending => {
                *slot = Slot::Pending;
                None
            }
            Slot::Taken => Some(Err(ConnectorError::Closed("the data connection was already used".to_string()))),
            Slot::Closed(reason) => {
                *slot = Slot::Closed(reason.clone());
                Some(Err(ConnectorError::Closed(reason)))
            }
        }
    }

    /// Waits until the stream is ready, checking at least every `poll` and giving up with
    /// [`ConnectorError::Timeout`] once `timeout` passed. Publishing a stream wakes the waiter
    /// right away.
    pub(super) async fn wait_ready(&self, timeout: Duration, poll: Duration) -> Result<DataStream, ConnectorError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(result) = self.try_take() {
                return result;
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ConnectorError::Timeout);
            }
            let next_check = std::cmp::min(now + poll, deadline);
            tokio::select! {
                _ = self.notify.notified() => {},
                _ = tokio::time::sleep_until(next_check) => {},
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const POLL: Duration = Duration::from_millis(250);

    #[tokio::test]
    async fn times_out_when_nothing_connects() {
        let cell = ReadyCell::new();
        let started = Instant::now();
        let result = cell.wait_ready(Duration::from_millis(300), Duration::from_millis(50)).await;
        assert!(matches!(result, Err(ConnectorError::Timeout)));
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn resolves_before_the_deadline_once_connected() {
        let cell = ReadyCell::new();
        let publisher = cell.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let (stream, _other_end) = tokio::io::duplex(64);
            publisher.connected(Box::new(stream));
        });

        let started = Instant::now();
        let result = cell.wait_ready(Duration::from_secs(5), POLL).await;
        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn already_connected_resolves_immediately() {
        let cell = ReadyCell::new();
        let (stream, _other_end) = tokio::io::duplex(64);
        cell.connected(Box::new(stream));
        assert!(cell.is_connected());
        assert!(cell.wait_ready(Duration::from_millis(1), POLL).await.is_ok());
        assert!(!cell.is_connected());
    }

    #[tokio::test]
    async fn closed_fails_without_timeout() {
        let cell = ReadyCell::new();
        cell.close("gone");
        match cell.wait_ready(Duration::from_secs(5), POLL).await {
            Err(ConnectorError::Closed(reason)) => assert_eq!(reason, "gone"),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn stream_published_after_close_is_dropped() {
        let cell = ReadyCell::new();
        cell.close("ended");
        let (stream, _other_end) = tokio::io::duplex(64);
        cell.connected(Box::new(stream));
        assert!(!cell.is_connected());
    }
}
