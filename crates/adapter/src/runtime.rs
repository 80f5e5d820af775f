//! Adapter runtime integration.
//!
//! Wires the TCP server to a controller running the given session.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::config::ServerConfig;
use crate::controller::{Controller, InboundCommand, OutboundMessage};
use crate::core::GameSession;
use crate::server::run_server;
use crate::source::RoundSource;

/// Serve `session` until the listener fails.
///
/// `ready_tx` receives the bound address, which is how tests find an
/// ephemeral port.
pub async fn run_game_server(
    config: ServerConfig,
    session: GameSession,
    source: Arc<dyn RoundSource>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let max_pending = config.max_pending_commands.max(1);
    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

    let map_ids = session
        .maps()
        .iter_sorted()
        .into_iter()
        .map(|m| m.id.clone())
        .collect();

    let controller = Controller::new(session, source, out_tx);
    let game_loop = tokio::spawn(controller.run(cmd_rx));

    let result = run_server(config, map_ids, cmd_tx, out_rx, ready_tx).await;
    game_loop.abort();
    result
}
