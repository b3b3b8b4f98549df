//! Contains the code that listens to control channel connections.

use super::{ServerError, chosen::OptionsHolder};
use crate::{
    server::{controlchan, shutdown},
    storage::StorageBackend,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

// Listener listens for control channel connections on a TCP port and spawns a control channel loop
// in a new task for each incoming connection.
pub(super) struct Listener<Storage>
where
    Storage: StorageBackend,
{
    pub bind_address: SocketAddr,
    pub logger: slog::Logger,
    pub options: OptionsHolder<Storage>,
    pub shutdown_topic: Arc<shutdown::Notifier>,
}

impl<Storage> Listener<Storage>
where
    Storage: StorageBackend + 'static,
{
    // Starts listening, returning an error if the TCP address could not be bound to.
    pub async fn listen(self) -> std::result::Result<(), ServerError> {
        let Listener {
            logger,
            bind_address,
            options,
            shutdown_topic,
        } = self;
        let listener = TcpListener::bind(bind_address).await?;
        slog::info!(logger, "Listening for control connections on {}", listener.local_addr()?);
        loop {
            match listener.accept().await {
                Ok((tcp_stream, socket_addr)) => {
                    slog::info!(logger, "Incoming control connection from {:?}", socket_addr);
                    let params: controlchan::LoopConfig<Storage> = (&options).into();
                    let result = controlchan::spawn_loop::<Storage>(params, tcp_stream, shutdown_topic.subscribe().await).await;
                    if let Err(err) = result {
                        slog::warn!(logger, "Could not spawn control channel loop for connection from {:?}: {:?}", socket_addr, err)
                    }
                }
                Err(err) => {
                    slog::error!(logger, "Error accepting incoming control connection {:?}", err);
                }
            }
        }
    }
}
