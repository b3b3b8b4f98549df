use super::{Event, Reply, error::ControlChanError, middleware::ControlChanMiddleware};

use async_trait::async_trait;

// Control channel middleware that logs all control channel events. Commands are logged through
// their Debug implementation, which hides PASS arguments.
pub(crate) struct LoggingMiddleware<Next>
where
    Next: ControlChanMiddleware,
{
    pub logger: slog::Logger,
    pub sequence_nr: u64,
    pub next: Next,
}

#[async_trait]
impl<Next> ControlChanMiddleware for LoggingMiddleware<Next>
where
    Next: ControlChanMiddleware,
{
    async fn handle(&mut self, event: Event) -> Result<Reply, ControlChanError> {
        self.sequence_nr += 1;
        slog::info!(self.logger, "Processing control channel event {:?}", event; "seq" => self.sequence_nr);
        let result = self.next.handle(event).await;
        slog::info!(self.logger, "Result of processing control channel event {:?}", result; "seq" => self.sequence_nr);
        result
    }
}
