//! TCP server for UI clients
//!
//! Handles incoming connections and manages client lifecycle. Handshake and
//! sequencing are enforced here; game commands are forwarded to the
//! controller through a bounded queue.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::controller::{ClientCommand, InboundCommand, OutboundMessage};
use crate::core::GameSettings;
use crate::protocol::*;
use crate::types::{DisplayPoint, GameMode, MAX_ROUND_COUNT};

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    map_ids: Vec<String>,
    clients: RwLock<Vec<ClientHandle>>,
}

impl ServerState {
    pub fn new(config: ServerConfig, map_ids: Vec<String>) -> Self {
        Self {
            config,
            map_ids,
            clients: RwLock::new(Vec::new()),
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

async fn is_handshaken(state: &ServerState, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.handshaken)
        .unwrap_or(false)
}

async fn check_and_update_seq(state: &ServerState, client_id: usize, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
        return true;
    };

    match client.last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            client.last_seq = Some(seq);
            true
        }
    }
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    map_ids: Vec<String>,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "TCP server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config, map_ids));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, message } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(message);
                        }
                    }
                    OutboundMessage::Broadcast { message } => {
                        for c in clients.iter().filter(|c| c.handshaken) {
                            let _ = c.tx.send(message.clone());
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let reply = |message: ServerMessage| {
        let _ = tx.send(message);
    };
    let error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ServerMessage::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parsed = match parse_message(trimmed) {
            Ok(parsed) => parsed,
            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                );
                continue;
            }
        };
        let seq = parsed.seq();
        let handshaken = is_handshaken(&state, client_id).await;

        if let ParsedMessage::Hello(hello) = &parsed {
            if handshaken && !check_and_update_seq(&state, client_id, seq).await {
                error(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                continue;
            }

            if let Some(version) = hello.protocol_version.as_deref() {
                if major(version) != major(&state.config.protocol_version) {
                    error(
                        seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", version),
                    );
                    break;
                }
            }

            {
                let mut clients = state.clients.write().await;
                if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                    client.handshaken = true;
                    client.last_seq = Some(seq);
                }
            }
            let name = hello.client.as_ref().map(|c| c.name.as_str()).unwrap_or("");
            debug!(client_id, name, "handshake complete");

            reply(ServerMessage::Welcome(create_welcome(
                seq,
                &state.config.protocol_version,
                client_id as u64,
                state.map_ids.clone(),
            )));
            continue;
        }

        if !handshaken {
            error(seq, ErrorCode::HandshakeRequired, "Send hello before commands");
            continue;
        }

        if !check_and_update_seq(&state, client_id, seq).await {
            error(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
            continue;
        }

        let command = match map_command(parsed) {
            Ok(command) => command,
            Err((code, message)) => {
                error(seq, code, &message);
                continue;
            }
        };

        // Backpressure: bounded queue.
        if command_tx
            .try_send(InboundCommand {
                client_id,
                seq,
                command,
            })
            .is_err()
        {
            error(seq, ErrorCode::Backpressure, "Command queue is full");
        }
    }

    {
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);
    }

    drop(tx);
    let _ = write_task.await;

    Ok(())
}

/// Map a protocol message into a controller command.
fn map_command(msg: ParsedMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    match msg {
        ParsedMessage::StartNewGame(m) => {
            let mode = GameMode::from_str(&m.mode)
                .ok_or_else(|| (ErrorCode::InvalidCommand, format!("Unknown mode: {}", m.mode)))?;
            let mut settings = GameSettings::new(mode);
            if let Some(rounds) = m.rounds {
                if rounds == 0 || rounds > MAX_ROUND_COUNT {
                    return Err((
                        ErrorCode::InvalidCommand,
                        format!("rounds must be between 1 and {}", MAX_ROUND_COUNT),
                    ));
                }
                settings = settings.with_rounds(rounds);
            }
            if let Some(timer) = m.timer {
                settings = settings.with_timer(timer);
            }
            Ok(ClientCommand::StartNewGame(settings))
        }
        ParsedMessage::PlaceGuess(m) => {
            if !m.x.is_finite() || !m.y.is_finite() {
                return Err((
                    ErrorCode::InvalidCommand,
                    "Guess coordinates must be finite".to_string(),
                ));
            }
            Ok(ClientCommand::PlaceGuess(DisplayPoint::new(m.x, m.y)))
        }
        ParsedMessage::SubmitNameGuess(m) => Ok(ClientCommand::SubmitNameGuess(m.text)),
        ParsedMessage::Skip(_) => Ok(ClientCommand::Skip),
        ParsedMessage::Advance(_) => Ok(ClientCommand::Advance),
        ParsedMessage::Reset(_) => Ok(ClientCommand::Reset),
        ParsedMessage::GetScores(_) => Ok(ClientCommand::GetScores),
        ParsedMessage::Unknown { msg_type, .. } => Err((
            ErrorCode::InvalidCommand,
            format!("Unknown message type: {}", msg_type),
        )),
        ParsedMessage::Hello(_) => Err((
            ErrorCode::InvalidCommand,
            "hello is not a command".to_string(),
        )),
    }
}
