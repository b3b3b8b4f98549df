//! libftpsrv is an embeddable, async FTP(S) server core.
//!
//! The host application supplies a [storage back-end](crate::storage::StorageBackend) and,
//! optionally, an [authenticator](crate::auth::Authenticator). The server takes care of the
//! control channel protocol, active and passive data connections, explicit TLS (AUTH TLS) and the
//! transfer state machine.
//!
//! ```no_run
//! use ftpsrv_sbe_fs::Filesystem;
//! use libftpsrv::Server;
//!
//! #[tokio::main]
//! pub async fn main() {
//!     let ftp_home = std::env::temp_dir();
//!     let server = Server::new(Box::new(move || Filesystem::new(&ftp_home)))
//!         .greeting("Welcome to my FTP server")
//!         .passive_ports(50000..=65535)
//!         .build()
//!         .unwrap();
//!
//!     server.listen("127.0.0.1:2121").await.unwrap();
//! }
//! ```

pub mod auth;
pub(crate) mod metrics;
pub mod notification;
pub(crate) mod server;
pub mod storage;

pub use crate::server::ftpserver::{Server, ServerBuilder, error::ServerError, options};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
