//! Prometheus counters for sessions, commands, replies and transfers. Without the `prometheus`
//! feature all functions here are no-ops.

use crate::server::controlchan::{Command, Reply};

#[cfg(feature = "prometheus")]
mod collect {
    use lazy_static::lazy_static;
    use prometheus::{IntCounter, IntCounterVec, opts, register_int_counter, register_int_counter_vec};

    lazy_static! {
        pub(super) static ref FTP_SESSIONS: Option<IntCounter> =
            register_int_counter!(opts!("ftp_sessions_total", "Total number of FTP sessions.")).ok();
        pub(super) static ref FTP_COMMAND_TOTAL: Option<IntCounterVec> =
            register_int_counter_vec!("ftp_command_total", "Total number of commands received.", &["command"]).ok();
        pub(super) static ref FTP_REPLY_TOTAL: Option<IntCounterVec> =
            register_int_counter_vec!("ftp_reply_total", "Total number of reply codes server sent to clients.", &["range"]).ok();
        pub(super) static ref FTP_TRANSFER_TOTAL: Option<IntCounterVec> =
            register_int_counter_vec!("ftp_transfer_total", "Total number of transfers by command and outcome.", &["command", "outcome"]).ok();
        pub(super) static ref FTP_TRANSFER_BYTES: Option<IntCounterVec> =
            register_int_counter_vec!("ftp_transfer_bytes", "Total number of bytes moved over data connections.", &["command"]).ok();
    }
}

/// Count a new session.
pub(crate) fn inc_session() {
    #[cfg(feature = "prometheus")]
    if let Some(c) = collect::FTP_SESSIONS.as_ref() {
        c.inc();
    }
}

/// Count a received command.
pub(crate) fn add_command_metric(cmd: &Command) {
    #[cfg(feature = "prometheus")]
    if let Some(c) = collect::FTP_COMMAND_TOTAL.as_ref() {
        c.with_label_values(&[cmd.directive.to_lowercase().as_str()]).inc();
    }
    #[cfg(not(feature = "prometheus"))]
    let _ = cmd;
}

/// Count a reply by its class (1xx, 2xx, ...).
pub(crate) fn add_reply_metric(reply: &Reply) {
    let code = match reply {
        Reply::None => return,
        Reply::CodeAndMsg { code, .. } | Reply::MultiLine { code, .. } => *code as u32,
    };
    #[cfg(feature = "prometheus")]
    if let Some(c) = collect::FTP_REPLY_TOTAL.as_ref() {
        c.with_label_values(&[format!("{}xx", code / 100 % 10).as_str()]).inc();
    }
    #[cfg(not(feature = "prometheus"))]
    let _ = code;
}

/// Count a finished transfer and the bytes it moved.
pub(crate) fn add_transfer_metric(command: &str, bytes: u64, ok: bool) {
    #[cfg(feature = "prometheus")]
    {
        let outcome = if ok { "success" } else { "failure" };
        if let Some(c) = collect::FTP_TRANSFER_TOTAL.as_ref() {
            c.with_label_values(&[command, outcome]).inc();
        }
        if let Some(c) = collect::FTP_TRANSFER_BYTES.as_ref() {
            c.with_label_values(&[command]).inc_by(bytes);
        }
    }
    #[cfg(not(feature = "prometheus"))]
    let _ = (command, bytes, ok);
}
