use super::{AuthenticationError, Authenticator, Credentials, Principal};
use async_trait::async_trait;

/// [`Authenticator`] that lets everybody in, keeping the storage back-end's root.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousAuthenticator;

#[async_trait]
impl Authenticator for AnonymousAuthenticator {
    async fn authenticate(&self, creds: &Credentials) -> Result<Principal, AuthenticationError> {
        Ok(Principal::new(creds.username.clone()))
    }
}
