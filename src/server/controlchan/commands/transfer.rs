//! The part of STOR, APPE, STOU, RETR, LIST and NLST that moves bytes over the data connection.
//!
//! Every transfer follows the same steps: take the session's connector and wait for its data
//! connection, open the back-end stream, send 150, move the bytes, end the connector and reply.
//! The session stays locked throughout, the control loop reads no further command until the
//! handler returns.

use super::{no_storage, storage_failure};
use crate::{
    metrics,
    options::{DATA_CONNECTION_POLL, DATA_CONNECTION_TIMEOUT},
    server::{
        controlchan::{Reply, ReplyCode, error::ControlChanError, handler::CommandContext, writer::write_raw},
        datachan::{ConnectorError, DataConnector},
        io::DataStream,
        listing::format_entry,
        session::Session,
    },
    storage::{self, ErrorKind, Metadata, Opened, StorageBackend, WriteOptions},
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

// Downloads move one chunk at a time: the next read only starts once the data socket took the
// previous one.
const CHUNK_SIZE: usize = 64 * 1024;

/// Takes the session's connector and waits for its data connection. The connector is handed back
/// with the stream so the caller can end it when the transfer is over.
async fn open_data_connection<S>(session: &mut Session<S>) -> Result<(Box<dyn DataConnector>, DataStream), ConnectorError>
where
    S: StorageBackend + 'static,
{
    let mut connector = session.connector.take().ok_or(ConnectorError::NotSetUp)?;
    match connector.wait_for_connection(DATA_CONNECTION_TIMEOUT, DATA_CONNECTION_POLL).await {
        Ok(stream) => Ok((connector, stream)),
        Err(err) => {
            connector.end();
            Err(err)
        }
    }
}

fn connector_failure(err: &ConnectorError) -> Reply {
    match err {
        ConnectorError::Timeout => Reply::new(ReplyCode::CantOpenDataConnection, "No connection established"),
        _ => Reply::new_with_string(err.reply_code(), err.to_string()),
    }
}

/// Receives a file into `path`. Used by STOR, APPE and STOU.
pub(super) async fn upload<S>(args: &CommandContext<S>, path: &str, append: bool) -> Result<Reply, ControlChanError>
where
    S: StorageBackend + 'static,
{
    let command = args.cmd.directive.as_str();
    let mut session = args.session.lock().await;
    if session.storage.is_none() {
        return Ok(no_storage());
    }

    let (mut connector, mut socket) = match open_data_connection(&mut session).await {
        Ok(connected) => connected,
        Err(err) => {
            slog::warn!(args.logger, "{}: no data connection: {}", command, err);
            if !matches!(err, ConnectorError::Timeout) {
                args.emitter.transfer(command, Some(err.to_string()), None).await;
            }
            return Ok(connector_failure(&err));
        }
    };

    let start = session.take_rest_byte_count();
    let opened = match session.storage.as_ref() {
        Some(storage) => storage.write(path, WriteOptions { append, start }).await,
        None => Err(storage::Error::from(ErrorKind::LocalError)),
    };
    let Opened {
        stream: mut sink,
        client_path,
        server_path,
    } = match opened {
        Ok(opened) => opened,
        Err(err) => {
            connector.end();
            return Ok(storage_open_failure(args, command, &err, ReplyCode::FileError).await);
        }
    };

    args.reply_writer.send(Reply::code(ReplyCode::FileStatusOkay)).await?;

    let copied = async {
        let bytes = tokio::io::copy(&mut socket, &mut sink).await?;
        sink.shutdown().await?;
        Ok::<u64, std::io::Error>(bytes)
    }
    .await;
    drop(socket);
    connector.end();

    match copied {
        Ok(bytes) => {
            slog::info!(args.logger, "{}: received {} bytes into {}", command, bytes, server_path);
            if args.collect_metrics {
                metrics::add_transfer_metric(command, bytes, true);
            }
            args.emitter.transfer(command, None, Some(server_path)).await;
            Ok(Reply::new_with_string(ReplyCode::ClosingDataConnection, client_path))
        }
        Err(err) => {
            slog::warn!(args.logger, "{}: transfer into {} failed: {}", command, server_path, err);
            if let Err(abort_err) = sink.abort().await {
                slog::warn!(args.logger, "{}: could not discard {}: {}", command, server_path, abort_err);
            }
            if args.collect_metrics {
                metrics::add_transfer_metric(command, 0, false);
            }
            args.emitter.transfer(command, Some(err.to_string()), None).await;
            Ok(Reply::new_with_string(ReplyCode::FileError, err.to_string()))
        }
    }
}

/// Sends the file at `path`, starting at the REST offset. Used by RETR.
pub(super) async fn download<S>(args: &CommandContext<S>, path: &str) -> Result<Reply, ControlChanError>
where
    S: StorageBackend + 'static,
{
    let command = args.cmd.directive.as_str();
    let mut session = args.session.lock().await;
    if session.storage.is_none() {
        return Ok(no_storage());
    }

    let (mut connector, mut socket) = match open_data_connection(&mut session).await {
        Ok(connected) => connected,
        Err(err) => {
            slog::warn!(args.logger, "{}: no data connection: {}", command, err);
            if !matches!(err, ConnectorError::Timeout) {
                args.emitter.transfer(command, Some(err.to_string()), None).await;
            }
            return Ok(connector_failure(&err));
        }
    };

    let start = session.take_rest_byte_count();
    let opened = match session.storage.as_ref() {
        Some(storage) => storage.read(path, start).await,
        None => Err(storage::Error::from(ErrorKind::LocalError)),
    };
    let Opened {
        stream: mut source,
        client_path,
        server_path,
    } = match opened {
        Ok(opened) => opened,
        Err(err) => {
            connector.end();
            return Ok(storage_open_failure(args, command, &err, ReplyCode::PageTypeUnknown).await);
        }
    };

    args.reply_writer.send(Reply::code(ReplyCode::FileStatusOkay)).await?;

    let sent = async {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut total: u64 = 0;
        loop {
            let n = source.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            socket.write_all(&buf[..n]).await?;
            total += n as u64;
        }
        socket.shutdown().await?;
        Ok::<u64, std::io::Error>(total)
    }
    .await;
    drop(source);
    drop(socket);
    connector.end();

    match sent {
        Ok(bytes) => {
            slog::info!(args.logger, "{}: sent {} bytes from {}", command, bytes, server_path);
            if args.collect_metrics {
                metrics::add_transfer_metric(command, bytes, true);
            }
            args.emitter.transfer(command, None, Some(server_path)).await;
            Ok(Reply::new_with_string(ReplyCode::ClosingDataConnection, client_path))
        }
        Err(err) => {
            slog::warn!(args.logger, "{}: transfer from {} failed: {}", command, server_path, err);
            if args.collect_metrics {
                metrics::add_transfer_metric(command, 0, false);
            }
            args.emitter.transfer(command, Some(err.to_string()), None).await;
            Ok(Reply::new_with_string(ReplyCode::PageTypeUnknown, err.to_string()))
        }
    }
}

// Capabilities the back-end lacks get 402 and no event, everything else is a failed transfer.
async fn storage_open_failure<S>(args: &CommandContext<S>, command: &str, err: &storage::Error, code: ReplyCode) -> Reply
where
    S: StorageBackend + 'static,
{
    slog::warn!(args.logger, "{}: could not open {}: {}", command, args.cmd.arg(), err);
    if err.kind() != ErrorKind::CommandNotImplemented {
        args.emitter.transfer(command, Some(err.message()), None).await;
    }
    storage_failure(err, code)
}

/// Sends a directory listing. LIST sends formatted entries, NLST only the names.
pub(super) async fn send_listing<S>(args: &CommandContext<S>, names_only: bool) -> Result<Reply, ControlChanError>
where
    S: StorageBackend + 'static,
{
    let path = listing_path(args.cmd.arg());
    let mut session = args.session.lock().await;
    if session.storage.is_none() {
        return Ok(no_storage());
    }

    let (mut connector, mut socket) = match open_data_connection(&mut session).await {
        Ok(connected) => connected,
        Err(err) => {
            slog::warn!(args.logger, "{}: no data connection: {}", args.cmd.directive, err);
            return Ok(connector_failure(&err));
        }
    };

    let lines = match session.storage.as_ref() {
        Some(storage) => list_lines(storage, path, args, names_only).await,
        None => Err(storage::Error::from(ErrorKind::LocalError)),
    };
    let lines = match lines {
        Ok(lines) => lines,
        Err(err) => {
            connector.end();
            slog::warn!(args.logger, "{}: could not list {}: {}", args.cmd.directive, path, err);
            return Ok(storage_failure(&err, ReplyCode::LocalError));
        }
    };

    args.reply_writer
        .send(Reply::new_with_string(
            ReplyCode::FileStatusOkay,
            format!("Accepted data connection, returning {} file(s)", lines.len()),
        ))
        .await?;

    let mut payload = lines.join("\r\n");
    if !payload.is_empty() {
        payload.push_str("\r\n");
    }
    let written = async {
        write_raw(&mut socket, payload.as_bytes()).await?;
        socket.shutdown().await
    }
    .await;
    drop(socket);
    connector.end();

    match written {
        Ok(()) => Ok(Reply::code(ReplyCode::ClosingDataConnection)),
        Err(err) => {
            slog::warn!(args.logger, "{}: could not send the listing: {}", args.cmd.directive, err);
            Ok(Reply::new_with_string(ReplyCode::LocalError, err.to_string()))
        }
    }
}

// The first argument word that isn't an option, `ls` style options like `-la` are ignored.
fn listing_path(arg: &str) -> &str {
    arg.split_whitespace().find(|word| !word.starts_with('-')).unwrap_or(".")
}

async fn list_lines<S>(storage: &S, path: &str, args: &CommandContext<S>, names_only: bool) -> storage::Result<Vec<String>>
where
    S: StorageBackend + 'static,
{
    let info = storage.get(path).await?;
    let entries = if info.metadata.is_dir() { storage.list(path).await? } else { vec![info] };
    Ok(entries
        .iter()
        .map(|entry| {
            if names_only {
                entry.name.clone()
            } else {
                format_entry(&args.list_format, &entry.name, &entry.metadata as &dyn Metadata)
            }
        })
        .collect())
}
