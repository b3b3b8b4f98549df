use super::event::{EventListener, EventMeta, ServerEvent};
use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};

/// Hands events of one session to the listener, stamping them with the session's metadata.
#[derive(Debug)]
pub(crate) struct EventEmitter {
    listener: Arc<dyn EventListener>,
    trace_id: String,
    username: RwLock<String>,
    sequence_nr: AtomicU64,
}

impl EventEmitter {
    pub(crate) fn new(listener: Arc<dyn EventListener>, trace_id: String) -> Self {
        EventEmitter {
            listener,
            trace_id,
            username: RwLock::new(String::new()),
            sequence_nr: AtomicU64::new(0),
        }
    }

    pub(crate) fn set_username(&self, username: &str) {
        let mut guard = self.username.write().unwrap_or_else(|e| e.into_inner());
        *guard = username.to_string();
    }

    pub(crate) async fn emit(&self, event: ServerEvent) {
        let meta = EventMeta {
            username: self.username.read().map(|u| u.clone()).unwrap_or_else(|e| e.into_inner().clone()),
            trace_id: self.trace_id.clone(),
            sequence_number: self.sequence_nr.fetch_add(1, Ordering::Relaxed) + 1,
        };
        self.listener.receive_event(event, meta).await
    }

    pub(crate) async fn transfer(&self, command: &str, error: Option<String>, server_path: Option<String>) {
        self.emit(ServerEvent::Transfer {
            command: command.to_string(),
            error,
            server_path,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        seen: Mutex<Vec<(ServerEvent, EventMeta)>>,
    }

    #[async_trait]
    impl EventListener for Recorder {
        async fn receive_event(&self, e: ServerEvent, m: EventMeta) {
            self.seen.lock().await.push((e, m));
        }
    }

    #[tokio::test]
    async fn stamps_events_with_session_metadata() {
        let recorder = Arc::new(Recorder::default());
        let emitter = EventEmitter::new(recorder.clone(), "abc".to_string());

        emitter.emit(ServerEvent::LoggedIn).await;
        emitter.set_username("alice");
        emitter.transfer("STOR", None, Some("/srv/f".to_string())).await;

        let seen = recorder.seen.lock().await;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1.username, "");
        assert_eq!(seen[0].1.sequence_number, 1);
        assert_eq!(seen[1].1.username, "alice");
        assert_eq!(seen[1].1.trace_id, "abc");
        assert_eq!(
            seen[1].0,
            ServerEvent::Transfer {
                command: "STOR".to_string(),
                error: None,
                server_path: Some("/srv/f".to_string()),
            }
        );
    }
}
