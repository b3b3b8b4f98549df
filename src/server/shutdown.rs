use tokio::sync::{Mutex, RwLock, broadcast, mpsc};

// Notifier lets sessions know that the server is shutting down and lets the server wait for them.
#[derive(Debug)]
pub(crate) struct Notifier {
    shutdown_tx: RwLock<Option<broadcast::Sender<()>>>,
    shutdown_complete_tx: RwLock<Option<mpsc::Sender<()>>>,
    shutdown_complete_rx: Mutex<mpsc::Receiver<()>>,
}

impl Notifier {
    pub(crate) fn new() -> Notifier {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (shutdown_complete_tx, shutdown_complete_rx) = mpsc::channel(1);
        Notifier {
            shutdown_tx: RwLock::new(Some(shutdown_tx)),
            shutdown_complete_tx: RwLock::new(Some(shutdown_complete_tx)),
            shutdown_complete_rx: Mutex::new(shutdown_complete_rx),
        }
    }

    // Tells all listeners that shutdown is commencing. They signal that they are done by dropping
    // their Listener.
    pub(crate) async fn notify(&self) {
        // Dropping the sender wakes every subscribed receiver.
        drop(self.shutdown_tx.write().await.take());
        // Drop our own completion sender so that linger() only waits for the listeners.
        drop(self.shutdown_complete_tx.write().await.take())
    }

    // Waits until every Listener is gone.
    pub(crate) async fn linger(&self) {
        let _ = self.shutdown_complete_rx.lock().await.recv().await;
    }

    pub(crate) async fn subscribe(&self) -> Listener {
        let sender_opt = self.shutdown_tx.read().await;
        let complete_sender_opt = self.shutdown_complete_tx.read().await;
        Listener {
            shutdown: sender_opt.is_none(),
            shutdown_rx: sender_opt.as_ref().map(|tx| tx.subscribe()),
            _shutdown_complete_tx: complete_sender_opt.clone(),
        }
    }
}

// Listener listens for shutdown notifications. Holding one keeps the server's linger() waiting.
#[derive(Debug)]
pub(crate) struct Listener {
    shutdown: bool,
    shutdown_rx: Option<broadcast::Receiver<()>>,
    _shutdown_complete_tx: Option<mpsc::Sender<()>>,
}

impl Listener {
    // Waits for the shutdown notice. Returns at once if it was already received.
    pub(crate) async fn listen(&mut self) {
        if self.shutdown {
            return;
        }
        if let Some(rx) = self.shutdown_rx.as_mut() {
            // Only a closed channel is ever observed here, no value is sent.
            let _ = rx.recv().await;
        }
        self.shutdown = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn listeners_wake_up_and_linger_waits_for_them() {
        let notifier = std::sync::Arc::new(Notifier::new());
        let mut listener = notifier.subscribe().await;

        let n = notifier.clone();
        let lingering = tokio::spawn(async move { n.linger().await });

        notifier.notify().await;
        tokio::time::timeout(Duration::from_secs(1), listener.listen()).await.unwrap();
        assert!(!lingering.is_finished());

        drop(listener);
        tokio::time::timeout(Duration::from_secs(1), lingering).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn late_subscribers_are_shut_down_already() {
        let notifier = Notifier::new();
        notifier.notify().await;
        let mut listener = notifier.subscribe().await;
        tokio::time::timeout(Duration::from_millis(100), listener.listen()).await.unwrap();
    }
}
