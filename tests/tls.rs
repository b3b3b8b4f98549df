#![allow(missing_docs)]
mod common;

use common::Client;
use ftpsrv_sbe_fs::Filesystem;
use libftpsrv::Server;
use pretty_assertions::assert_eq;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use tokio_rustls::{TlsConnector, client::TlsStream, rustls::pki_types::ServerName};

async fn protected_data(client: &mut Client, connector: &TlsConnector) -> TlsStream<TcpStream> {
    let socket = client.passive().await;
    connector.connect(ServerName::try_from("localhost").unwrap(), socket).await.unwrap()
}

#[tokio::test]
async fn auth_tls_protects_control_and_data() {
    let addr = "127.0.0.1:2175";
    let root = tempfile::tempdir().unwrap();
    let home = root.path().to_path_buf();
    common::start(
        Server::new(Box::new(move || Filesystem::new(home.clone()))).ftps(common::resource("server-certs.pem"), common::resource("server-key.pem")),
        addr,
    );
    let connector = common::tls_connector();
    let (mut client, _) = Client::connect(addr).await;

    // Protection commands mean nothing before the upgrade.
    assert_eq!(client.cmd("PBSZ 0").await.code, 202);
    assert_eq!(client.cmd("PROT P").await.code, 202);

    assert_eq!(client.cmd("AUTH SSL").await.code, 504);
    assert_eq!(client.cmd("AUTH TLS").await.code, 234);
    let mut client = client.secure(&connector).await;
    client.login().await;

    assert_eq!(client.cmd("PROT P").await.code, 503);
    assert_eq!(client.cmd("PBSZ 0").await.code, 200);
    assert_eq!(client.cmd("PROT C").await.code, 536);
    assert_eq!(client.cmd("PROT P").await.code, 200);

    let mut data = protected_data(&mut client, &connector).await;
    assert_eq!(client.cmd("STOR secret.txt").await.code, 150);
    data.write_all(b"tls payload").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert_eq!(client.reply().await.code, 226);
    assert_eq!(std::fs::read(root.path().join("secret.txt")).unwrap(), b"tls payload");

    let mut data = protected_data(&mut client, &connector).await;
    assert_eq!(client.cmd("RETR secret.txt").await.code, 150);
    let mut content = vec![];
    data.read_to_end(&mut content).await.unwrap();
    assert_eq!(client.reply().await.code, 226);
    assert_eq!(content, b"tls payload");

    let mut data = protected_data(&mut client, &connector).await;
    assert_eq!(client.cmd("LIST").await.code, 150);
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert_eq!(client.reply().await.code, 226);
    assert!(listing.trim_end().ends_with("secret.txt"), "{:?}", listing);

    assert_eq!(client.cmd("QUIT").await.code, 221);
}

#[tokio::test]
async fn auth_tls_without_certificates_is_refused() {
    let addr = "127.0.0.1:2176";
    let root = tempfile::tempdir().unwrap();
    let home = root.path().to_path_buf();
    common::start(Server::new(Box::new(move || Filesystem::new(home.clone()))), addr);
    let (mut client, _) = Client::connect(addr).await;

    assert_eq!(client.cmd("AUTH TLS").await.code, 502);
    assert_eq!(client.cmd("NOOP").await.code, 200);
}
