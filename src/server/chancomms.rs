//! Contains the messages that are sent to the control loop from elsewhere in the session.

use std::net::SocketAddr;

/// Messages that the control loop acts upon in between commands.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ControlChanMsg {
    /// AUTH TLS was accepted; wrap the control socket in TLS before reading the next command.
    SecureControlChannel,
    /// QUIT was received; close the session once the reply is out.
    ExitControlLoop,
    /// Someone other than the client connected to the advertised passive port.
    PassiveAddressMismatch {
        /// Where the rogue connection came from
        peer: SocketAddr,
    },
}
