//! Contains the [`StorageBackend`] trait that the server moves files in and out of, and the types
//! that go with it. See [`ftpsrv_core::storage`].

pub use ftpsrv_core::storage::*;
