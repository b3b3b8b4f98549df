//! Contains the [`Authenticator`] trait used to resolve the credentials a client presents into a
//! [`Principal`].
//!
//! An authenticator either accepts the user, optionally assigning it a root directory inside the
//! storage back-end, or rejects it with a reply code and message:
//!
//! ```no_run
//! use async_trait::async_trait;
//! use ftpsrv_core::auth::{AuthenticationError, Authenticator, Credentials, Principal};
//!
//! #[derive(Debug)]
//! struct OnlyBob;
//!
//! #[async_trait]
//! impl Authenticator for OnlyBob {
//!     async fn authenticate(&self, creds: &Credentials) -> Result<Principal, AuthenticationError> {
//!         match creds.username.as_str() {
//!             "bob" => Ok(Principal::with_root("bob", "/home/bob")),
//!             _ => Err(AuthenticationError::BadUser),
//!         }
//!     }
//! }
//! ```

mod anonymous;
pub use anonymous::AnonymousAuthenticator;

mod authenticator;
pub use authenticator::{AuthenticationError, Authenticator, Credentials, Principal};
