use super::event::{EventListener, EventMeta, ServerEvent};
use async_trait::async_trait;

/// An [`EventListener`] that ignores everything. It is the default.
#[derive(Debug)]
pub struct NopListener {}

#[async_trait]
impl EventListener for NopListener {
    async fn receive_event(&self, _: ServerEvent, _: EventMeta) {}
}
