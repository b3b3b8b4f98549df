use super::{Event, Reply, ReplyCode, error::ControlChanError, middleware::ControlChanMiddleware, registry};
use crate::{server::session::SharedSession, storage::StorageBackend};

use async_trait::async_trait;

// AuthMiddleware ensures the user is authenticated before he can do much else. Which commands
// are exempt is declared in the registry.
pub(crate) struct AuthMiddleware<Storage, Next>
where
    Storage: StorageBackend + 'static,
    Next: ControlChanMiddleware,
{
    pub session: SharedSession<Storage>,
    pub next: Next,
}

#[async_trait]
impl<Storage, Next> ControlChanMiddleware for AuthMiddleware<Storage, Next>
where
    Storage: StorageBackend + 'static,
    Next: ControlChanMiddleware,
{
    async fn handle(&mut self, event: Event) -> Result<Reply, ControlChanError> {
        if let Event::Command(cmd) = &event {
            let no_auth = registry::lookup(&cmd.directive).map(|spec| spec.no_auth).unwrap_or(false);
            if !no_auth && !self.session.lock().await.is_authenticated() {
                return Ok(Reply::new_with_string(
                    ReplyCode::NotLoggedIn,
                    format!("Command requires authentication: {}", cmd.directive),
                ));
            }
        }
        self.next.handle(event).await
    }
}
