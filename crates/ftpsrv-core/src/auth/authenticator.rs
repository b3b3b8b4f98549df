use crate::BoxError;
use async_trait::async_trait;
use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;
use thiserror::Error;

/// Resolves the credentials given by the client at login time.
#[async_trait]
pub trait Authenticator: Sync + Send + Debug {
    /// Authenticate the given user with the given credentials.
    async fn authenticate(&self, creds: &Credentials) -> Result<Principal, AuthenticationError>;
}

/// The username and password a client sent with USER and PASS.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The name given with USER
    pub username: String,
    /// The password given with PASS, if any
    pub password: Option<String>,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .finish()
    }
}

impl Credentials {
    /// Creates credentials for the given user and password.
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Credentials {
            username: username.into(),
            password: Some(password.into()),
        }
    }
}

/// An authenticated user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    /// The name the user logged in with
    pub username: String,
    /// The directory, relative to the storage back-end's own root, that becomes this user's root.
    /// `None` keeps the back-end root.
    pub root: Option<PathBuf>,
}

impl Principal {
    /// A principal that keeps the storage back-end's root.
    pub fn new<U: Into<String>>(username: U) -> Self {
        Principal {
            username: username.into(),
            root: None,
        }
    }

    /// A principal that is confined to the given directory.
    pub fn with_root<U: Into<String>, P: Into<PathBuf>>(username: U, root: P) -> Self {
        Principal {
            username: username.into(),
            root: Some(root.into()),
        }
    }
}

/// The error type returned by [`Authenticator::authenticate`].
#[derive(Error, Debug)]
pub enum AuthenticationError {
    /// The password is incorrect
    #[error("bad password")]
    BadPassword,
    /// The user is unknown
    #[error("unknown user")]
    BadUser,
    /// The authenticator turned the user down with a specific reply code and message.
    #[error("{message}")]
    Rejected {
        /// The FTP reply code to send to the client
        code: u32,
        /// The reply message to send to the client
        message: String,
    },
    /// Something went wrong inside the authenticator itself.
    #[error("authentication error: {0}")]
    ImplPropagated(String, #[source] Option<BoxError>),
}

impl AuthenticationError {
    /// Creates an error that carries an inner error from the authenticator implementation.
    pub fn with_source<E>(msg: &str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        AuthenticationError::ImplPropagated(msg.to_string(), Some(source.into()))
    }

    /// The reply code the server sends for this error.
    pub fn reply_code(&self) -> u32 {
        match self {
            AuthenticationError::Rejected { code, .. } => *code,
            _ => 530,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn password_is_not_debug_printed() {
        let creds = Credentials::new("alice", "s3cret");
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("alice"));
    }

    #[test]
    fn rejection_carries_its_own_code() {
        let err = AuthenticationError::Rejected {
            code: 421,
            message: "Too many users".to_string(),
        };
        assert_eq!(err.reply_code(), 421);
        assert_eq!(err.to_string(), "Too many users");
        assert_eq!(AuthenticationError::BadPassword.reply_code(), 530);
    }
}
