//! Contains the [`Authenticator`] trait that the server uses to decide who may log in, and the
//! types that go with it. See [`ftpsrv_core::auth`].

pub use ftpsrv_core::auth::*;
