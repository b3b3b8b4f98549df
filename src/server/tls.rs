use crate::options::TlsFlags;
use moka::sync::Cache;
use rustls::{
    ServerConfig,
    pki_types::{CertificateDer, PrivateKeyDer, pem::PemObject},
    server::{NoServerSessionStorage, StoresServerSessions},
};
use std::{
    fmt::{self, Debug, Formatter},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use thiserror::Error;

// FtpsConfig shows how TLS security is configured for the server.
#[derive(Clone)]
pub(crate) enum FtpsConfig {
    Off,
    Building { certs_file: PathBuf, key_file: PathBuf },
    On { tls_config: Arc<ServerConfig> },
}

impl Debug for FtpsConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FtpsConfig::Off => write!(f, "Off"),
            FtpsConfig::Building { .. } => write!(f, "Building"),
            FtpsConfig::On { .. } => write!(f, "On"),
        }
    }
}

impl FtpsConfig {
    /// A TLS acceptor when FTPS is usable.
    pub(crate) fn acceptor(&self) -> Option<tokio_rustls::TlsAcceptor> {
        match self {
            FtpsConfig::On { tls_config } => Some(tokio_rustls::TlsAcceptor::from(tls_config.clone())),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    #[error("error reading key/certificate input")]
    Load(#[from] rustls::pki_types::pem::Error),

    #[error("no certificates found in {0}")]
    NoCertificates(PathBuf),

    #[error("could not build the TLS configuration: {0}")]
    Tls(#[from] rustls::Error),
}

pub(crate) fn new_config<P: AsRef<Path>>(certs_file: P, key_file: P, flags: TlsFlags) -> Result<Arc<ServerConfig>, ConfigError> {
    let certs: Vec<CertificateDer<'static>> = CertificateDer::pem_file_iter(certs_file.as_ref())?.collect::<Result<_, _>>()?;
    if certs.is_empty() {
        return Err(ConfigError::NoCertificates(certs_file.as_ref().to_path_buf()));
    }
    let privkey = PrivateKeyDer::from_pem_file(key_file.as_ref())?;

    let mut versions: Vec<&'static rustls::SupportedProtocolVersion> = vec![];
    if flags.contains(TlsFlags::V1_2) {
        versions.push(&rustls::version::TLS12);
    }
    if flags.contains(TlsFlags::V1_3) {
        versions.push(&rustls::version::TLS13);
    }

    let mut config = ServerConfig::builder_with_protocol_versions(&versions)
        .with_no_client_auth()
        .with_single_cert(certs, privkey)?;

    // Support session resumption with server side state (Session IDs)
    config.session_storage = if flags.contains(TlsFlags::RESUMPTION_SESS_ID) {
        TlsSessionCache::new(1024)
    } else {
        Arc::new(NoServerSessionStorage {})
    };
    // Support session resumption with tickets. See https://tools.ietf.org/html/rfc5077
    if flags.contains(TlsFlags::RESUMPTION_TICKETS) {
        #[cfg(feature = "aws_lc_rs")]
        {
            config.ticketer = rustls::crypto::aws_lc_rs::Ticketer::new()?;
        }
        #[cfg(all(feature = "ring", not(feature = "aws_lc_rs")))]
        {
            config.ticketer = rustls::crypto::ring::Ticketer::new()?;
        }
    }
    // Don't allow dumping session keys
    config.key_log = Arc::new(NoKeyLog {});

    Ok(Arc::new(config))
}

#[derive(Debug)]
struct NoKeyLog;

impl rustls::KeyLog for NoKeyLog {
    fn log(&self, _label: &str, _client_random: &[u8], _secret: &[u8]) {}
}

/// Stores the session IDs server side. Data connections resume the control connection's session,
/// which many clients insist on.
#[derive(Debug)]
struct TlsSessionCache {
    cache: Cache<Vec<u8>, Vec<u8>>,
}

impl TlsSessionCache {
    /// Make a new TlsSessionCache.  `size` is the maximum
    /// number of stored sessions.
    fn new(size: u64) -> Arc<TlsSessionCache> {
        debug_assert!(size > 0);
        Arc::new(TlsSessionCache {
            cache: Cache::builder().max_capacity(size).time_to_idle(Duration::from_secs(5 * 60)).build(),
        })
    }
}

impl StoresServerSessions for TlsSessionCache {
    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> bool {
        self.cache.insert(key, value);
        true
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.cache.get(key)
    }

    fn take(&self, key: &[u8]) -> Option<Vec<u8>> {
        // Data connections reuse the same session ID, so a take must not remove it.
        self.cache.get(key)
    }

    fn can_cache(&self) -> bool {
        true
    }
}
