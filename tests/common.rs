#![allow(missing_docs)]
#![allow(dead_code)]

use async_trait::async_trait;
use libftpsrv::{
    ServerBuilder,
    auth::{AuthenticationError, Authenticator, Credentials, Principal},
    notification::{EventListener, EventMeta, ServerEvent},
    storage::StorageBackend,
};
use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tokio_rustls::{
    TlsConnector,
    rustls::{
        ClientConfig, RootCertStore,
        pki_types::{CertificateDer, ServerName, pem::PemObject},
    },
};

pub const USER: &str = "alice";
pub const PASSWORD: &str = "secret";

/// Lets alice in with her password, nobody else.
#[derive(Debug)]
pub struct TestAuthenticator;

#[async_trait]
impl Authenticator for TestAuthenticator {
    async fn authenticate(&self, creds: &Credentials) -> Result<Principal, AuthenticationError> {
        if creds.username != USER {
            return Err(AuthenticationError::BadUser);
        }
        match creds.password.as_deref() {
            Some(PASSWORD) => Ok(Principal::new(USER)),
            _ => Err(AuthenticationError::BadPassword),
        }
    }
}

/// Keeps every event the server emits.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    events: Arc<Mutex<Vec<ServerEvent>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<ServerEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventListener for Recorder {
    async fn receive_event(&self, e: ServerEvent, _m: EventMeta) {
        self.events.lock().unwrap().push(e);
    }
}

/// Builds the server and runs it in the background.
pub fn start<S>(builder: ServerBuilder<S>, addr: &'static str)
where
    S: StorageBackend + 'static,
{
    let server = builder.authenticator(Arc::new(TestAuthenticator)).build().unwrap();
    tokio::spawn(server.listen(addr));
}

/// One reply as the client sees it: the code and the text of every line, codes stripped.
#[derive(Debug)]
pub struct Reply {
    pub code: u32,
    pub lines: Vec<String>,
}

impl Reply {
    /// The text of the last line.
    pub fn text(&self) -> &str {
        self.lines.last().map(String::as_str).unwrap_or("")
    }
}

/// A file under `tests/resources`.
pub fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("resources").join(name)
}

/// A TLS client that trusts the test CA.
pub fn tls_connector() -> TlsConnector {
    let mut roots = RootCertStore::empty();
    roots.add(CertificateDer::from_pem_file(resource("ca.pem")).unwrap()).unwrap();
    let config = ClientConfig::builder().with_root_certificates(roots).with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

/// Any byte stream the control connection can run over.
pub trait ClientStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> ClientStream for T {}

pub struct Client {
    stream: BufReader<Box<dyn ClientStream>>,
}

impl Client {
    /// Connects, retrying while the server is still starting, and reads the greeting.
    pub async fn connect(addr: &str) -> (Client, Reply) {
        let mut attempts = 0;
        let stream = loop {
            match TcpStream::connect(addr).await {
                Ok(stream) => break stream,
                Err(_) if attempts < 50 => {
                    attempts += 1;
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                Err(err) => panic!("could not connect to {}: {}", addr, err),
            }
        };
        let mut client = Client {
            stream: BufReader::new(Box::new(stream)),
        };
        let greeting = client.reply().await;
        (client, greeting)
    }

    pub async fn send(&mut self, line: &str) {
        self.stream.write_all(format!("{}\r\n", line).as_bytes()).await.unwrap();
        self.stream.flush().await.unwrap();
    }

    /// Reads one complete reply, following multi-line continuations.
    pub async fn reply(&mut self) -> Reply {
        let mut lines = vec![];
        loop {
            let mut line = String::new();
            let n = tokio::time::timeout(Duration::from_secs(10), self.stream.read_line(&mut line))
                .await
                .expect("timed out waiting for a reply")
                .unwrap();
            assert!(n > 0, "connection closed while waiting for a reply");
            let line = line.trim_end_matches(['\r', '\n']).to_string();
            let bytes = line.as_bytes();
            let is_last = bytes.len() >= 4 && bytes[..3].iter().all(u8::is_ascii_digit) && bytes[3] == b' ';
            let is_first = bytes.len() >= 4 && bytes[..3].iter().all(u8::is_ascii_digit) && bytes[3] == b'-';
            if is_last {
                let code = line[..3].parse().unwrap();
                lines.push(line[4..].to_string());
                return Reply { code, lines };
            }
            if is_first {
                lines.push(line[4..].to_string());
            } else {
                lines.push(line);
            }
        }
    }

    /// Whether the server closed the control connection.
    pub async fn is_closed(&mut self) -> bool {
        let mut line = String::new();
        matches!(
            tokio::time::timeout(Duration::from_secs(5), self.stream.read_line(&mut line)).await,
            Ok(Ok(0)) | Ok(Err(_))
        )
    }

    pub async fn cmd(&mut self, line: &str) -> Reply {
        self.send(line).await;
        self.reply().await
    }

    pub async fn login(&mut self) {
        assert_eq!(self.cmd(&format!("USER {}", USER)).await.code, 331);
        assert_eq!(self.cmd(&format!("PASS {}", PASSWORD)).await.code, 230);
    }

    /// Runs the TLS handshake on the control connection, after AUTH TLS was accepted.
    pub async fn secure(self, connector: &TlsConnector) -> Client {
        let plain = self.stream.into_inner();
        let tls = connector.connect(ServerName::try_from("localhost").unwrap(), plain).await.unwrap();
        Client {
            stream: BufReader::new(Box::new(tls)),
        }
    }

    /// Enters passive mode and connects to the advertised port.
    pub async fn passive(&mut self) -> TcpStream {
        let addr = self.passive_addr().await;
        TcpStream::connect(addr).await.unwrap()
    }

    /// Enters passive mode and returns the advertised address without connecting.
    pub async fn passive_addr(&mut self) -> SocketAddr {
        let reply = self.cmd("PASV").await;
        assert_eq!(reply.code, 227, "{:?}", reply);
        let text = reply.text();
        let inner = &text[text.find('(').unwrap() + 1..text.find(')').unwrap()];
        let parts: Vec<u16> = inner.split(',').map(|p| p.parse().unwrap()).collect();
        SocketAddr::from((
            [parts[0] as u8, parts[1] as u8, parts[2] as u8, parts[3] as u8],
            parts[4] * 256 + parts[5],
        ))
    }
}
