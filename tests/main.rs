#![allow(missing_docs)]
mod common;

use common::{Client, Recorder};
use ftpsrv_sbe_fs::Filesystem;
use libftpsrv::{Server, ServerBuilder, notification::ServerEvent};
use pretty_assertions::assert_eq;
use std::{path::PathBuf, sync::Arc};
use tokio::{io::AsyncReadExt, net::TcpSocket};

fn fs_server(root: PathBuf) -> ServerBuilder<Filesystem> {
    Server::new(Box::new(move || Filesystem::new(root.clone())))
}

#[tokio::test]
async fn greets_with_the_configured_banner() {
    let addr = "127.0.0.1:2150";
    let root = tempfile::tempdir().unwrap();
    common::start(fs_server(root.path().to_path_buf()).greeting("Welcome\nto the tests"), addr);

    let (_client, greeting) = Client::connect(addr).await;
    assert_eq!(greeting.code, 220);
    assert_eq!(greeting.lines, vec!["Welcome", "to the tests", "Ready"]);
}

#[tokio::test]
async fn help_lists_and_describes_commands() {
    let addr = "127.0.0.1:2151";
    let root = tempfile::tempdir().unwrap();
    common::start(fs_server(root.path().to_path_buf()), addr);
    let (mut client, _) = Client::connect(addr).await;

    let overview = client.cmd("HELP").await;
    assert_eq!(overview.code, 211);
    let listed = overview.lines.join("\t");
    for name in ["STOR", "RETR", "PASV", "EPSV", "SITE", "FEAT"] {
        assert!(listed.split('\t').any(|n| n == name), "{} missing from {:?}", name, overview.lines);
    }

    let stor = client.cmd("HELP stor").await;
    assert_eq!(stor.code, 214);
    assert!(stor.lines[0].starts_with("STOR"), "{:?}", stor.lines);

    assert_eq!(client.cmd("HELP FROB").await.code, 502);
}

#[tokio::test]
async fn feat_lists_sorted_extensions() {
    let addr = "127.0.0.1:2152";
    let root = tempfile::tempdir().unwrap();
    common::start(fs_server(root.path().to_path_buf()), addr);
    let (mut client, _) = Client::connect(addr).await;

    let feat = client.cmd("FEAT").await;
    assert_eq!(feat.code, 211);
    let features: Vec<String> = feat.lines[1..feat.lines.len() - 1].iter().map(|l| l.trim().to_string()).collect();
    assert!(features.contains(&"UTF8".to_string()));
    assert!(features.contains(&"EPSV".to_string()));
    let mut sorted = features.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(features, sorted);
}

#[tokio::test]
async fn commands_require_login() {
    let addr = "127.0.0.1:2153";
    let root = tempfile::tempdir().unwrap();
    common::start(fs_server(root.path().to_path_buf()), addr);
    let (mut client, _) = Client::connect(addr).await;

    let pwd = client.cmd("PWD").await;
    assert_eq!(pwd.code, 530);
    assert_eq!(pwd.text(), "Command requires authentication: PWD");

    assert_eq!(client.cmd("NOOP").await.code, 200);
    assert_eq!(client.cmd("USER alice").await.code, 331);
    assert_eq!(client.cmd("PASS wrong").await.code, 530);
    assert_eq!(client.cmd("PASS secret").await.code, 230);
    assert_eq!(client.cmd("USER bob").await.code, 530);

    let pwd = client.cmd("PWD").await;
    assert_eq!(pwd.code, 257);
    assert_eq!(pwd.text(), "\"/\" is your current location");
}

#[tokio::test]
async fn unknown_and_blacklisted_commands_get_502() {
    let addr = "127.0.0.1:2154";
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("keep.txt"), b"x").unwrap();
    common::start(fs_server(root.path().to_path_buf()).blacklist(["dele", "site_chmod"]), addr);
    let (mut client, _) = Client::connect(addr).await;
    client.login().await;

    let unknown = client.cmd("FROB").await;
    assert_eq!(unknown.code, 502);
    assert_eq!(unknown.text(), "Command not allowed: FROB");

    assert_eq!(client.cmd("DELE keep.txt").await.code, 502);
    assert!(root.path().join("keep.txt").exists());

    assert_eq!(client.cmd("SITE CHMOD 600 keep.txt").await.code, 502);
    assert_eq!(client.cmd("ACCT billing").await.code, 502);
}

#[tokio::test]
async fn port_to_a_foreign_host_is_refused() {
    let addr = "127.0.0.1:2155";
    let root = tempfile::tempdir().unwrap();
    common::start(fs_server(root.path().to_path_buf()), addr);
    let (mut client, _) = Client::connect(addr).await;
    client.login().await;

    assert_eq!(client.cmd("PORT 10,1,2,3,4,1").await.code, 500);
    assert_eq!(client.cmd("EPRT |1|10.1.2.3|1025|").await.code, 500);
    assert_eq!(client.cmd("PORT 1,2,3").await.code, 425);
    // No data connection was set up by the refused commands.
    assert_eq!(client.cmd("LIST").await.code, 425);
}

#[tokio::test]
async fn directory_commands() {
    let addr = "127.0.0.1:2156";
    let root = tempfile::tempdir().unwrap();
    common::start(fs_server(root.path().to_path_buf()), addr);
    let (mut client, _) = Client::connect(addr).await;
    client.login().await;

    assert_eq!(client.cmd("MKD docs").await.code, 257);
    assert!(root.path().join("docs").is_dir());

    let cwd = client.cmd("CWD docs").await;
    assert_eq!(cwd.code, 250);
    assert_eq!(cwd.text(), "OK. Current directory is \"/docs\"");
    assert_eq!(client.cmd("CDUP").await.code, 250);
    assert_eq!(client.cmd("PWD").await.text(), "\"/\" is your current location");

    assert_eq!(client.cmd("RNTO nowhere").await.code, 503);
    assert_eq!(client.cmd("RNFR docs").await.code, 350);
    assert_eq!(client.cmd("RNTO papers").await.code, 250);
    assert!(root.path().join("papers").is_dir());

    assert_eq!(client.cmd("RMD papers").await.code, 250);
    assert!(!root.path().join("papers").exists());
    assert_eq!(client.cmd("CWD papers").await.code, 550);
}

#[tokio::test]
async fn stat_size_and_mdtm() {
    let addr = "127.0.0.1:2157";
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("a.txt"), b"12345").unwrap();
    common::start(fs_server(root.path().to_path_buf()), addr);
    let (mut client, _) = Client::connect(addr).await;
    client.login().await;

    assert_eq!(client.cmd("STAT").await.code, 211);

    let file = client.cmd("STAT a.txt").await;
    assert_eq!(file.code, 212);
    assert!(file.lines.iter().any(|l| l.ends_with("a.txt")), "{:?}", file.lines);

    let dir = client.cmd("STAT /").await;
    assert_eq!(dir.code, 213);
    assert!(dir.lines.iter().any(|l| l.ends_with("a.txt")), "{:?}", dir.lines);

    assert_eq!(client.cmd("STAT missing").await.code, 450);

    let size = client.cmd("SIZE a.txt").await;
    assert_eq!(size.code, 213);
    assert_eq!(size.text(), "5");

    let mdtm = client.cmd("MDTM a.txt").await;
    assert_eq!(mdtm.code, 213);
    assert_eq!(mdtm.text().len(), "YYYYMMDDHHmmss.SSS".len());
}

#[tokio::test]
async fn list_and_nlst_over_passive_connections() {
    let addr = "127.0.0.1:2158";
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("one.txt"), b"1").unwrap();
    std::fs::create_dir(root.path().join("sub")).unwrap();
    common::start(fs_server(root.path().to_path_buf()), addr);
    let (mut client, _) = Client::connect(addr).await;
    client.login().await;

    let mut data = client.passive().await;
    let opening = client.cmd("LIST -la").await;
    assert_eq!(opening.code, 150);
    assert_eq!(opening.text(), "Accepted data connection, returning 2 file(s)");
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert_eq!(client.reply().await.code, 226);
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(listing.ends_with("\r\n"));
    assert!(lines.iter().any(|l| l.starts_with('d') && l.ends_with("sub")), "{:?}", lines);
    assert!(lines.iter().any(|l| l.starts_with('-') && l.ends_with("one.txt")), "{:?}", lines);

    let mut data = client.passive().await;
    assert_eq!(client.cmd("NLST").await.code, 150);
    let mut names = String::new();
    data.read_to_string(&mut names).await.unwrap();
    assert_eq!(client.reply().await.code, 226);
    let mut names: Vec<&str> = names.lines().collect();
    names.sort();
    assert_eq!(names, vec!["one.txt", "sub"]);
}

#[tokio::test]
async fn events_follow_the_session() {
    let addr = "127.0.0.1:2159";
    let root = tempfile::tempdir().unwrap();
    let recorder = Recorder::default();
    common::start(fs_server(root.path().to_path_buf()).notify(Arc::new(recorder.clone())), addr);
    let (mut client, _) = Client::connect(addr).await;
    client.login().await;
    let bye = client.cmd("QUIT").await;
    assert_eq!(bye.code, 221);
    assert!(client.is_closed().await);

    // Disconnected is emitted once the control loop wound down.
    for _ in 0..50 {
        if recorder.events().iter().any(|e| matches!(e, ServerEvent::Disconnected { .. })) {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    let events = recorder.events();
    assert!(matches!(events[0], ServerEvent::Connected { .. }), "{:?}", events);
    assert_eq!(events[1], ServerEvent::LoggedIn);
    assert!(matches!(events[2], ServerEvent::Disconnected { .. }), "{:?}", events);
}

#[tokio::test]
async fn idle_sessions_time_out() {
    let addr = "127.0.0.1:2160";
    let root = tempfile::tempdir().unwrap();
    common::start(fs_server(root.path().to_path_buf()).idle_session_timeout(1), addr);
    let (mut client, _) = Client::connect(addr).await;

    let reply = client.reply().await;
    assert_eq!(reply.code, 421);
    assert_eq!(reply.text(), "Session timed out. Closing control connection");
    assert!(client.is_closed().await);
}

#[tokio::test]
async fn passive_connection_from_a_foreign_host_ends_the_session() {
    let addr = "127.0.0.1:2161";
    let root = tempfile::tempdir().unwrap();
    common::start(fs_server(root.path().to_path_buf()), addr);
    let (mut client, _) = Client::connect(addr).await;
    client.login().await;

    let data_addr = client.passive_addr().await;
    let socket = TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.2:0".parse().unwrap()).unwrap();
    let _intruder = socket.connect(data_addr).await.unwrap();

    let reply = client.reply().await;
    assert_eq!(reply.code, 550);
    assert_eq!(reply.text(), "Remote addresses do not match");
    assert!(client.is_closed().await);
}

#[tokio::test]
async fn overlong_command_lines_end_the_session() {
    let addr = "127.0.0.1:2162";
    let root = tempfile::tempdir().unwrap();
    common::start(fs_server(root.path().to_path_buf()), addr);
    let (mut client, _) = Client::connect(addr).await;

    let reply = client.cmd(&format!("NOOP {}", "x".repeat(9000))).await;
    assert_eq!(reply.code, 500);
    assert_eq!(reply.text(), "Command line too long");
    assert!(client.is_closed().await);
}
