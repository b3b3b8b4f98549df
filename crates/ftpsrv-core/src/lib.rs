//! Core traits and types that a libftpsrv server is composed with: the storage back-end that
//! holds the files and the authenticator that decides who gets in.

pub mod auth;
pub mod storage;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
