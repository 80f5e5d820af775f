//! Adapter module - UI control via TCP socket with JSON protocol
//!
//! Hosts the game core behind a line-delimited JSON protocol so any UI (web
//! page, terminal client, test harness) can drive a game.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Commanding**: Client sends game commands, each answered by `ack` or `error`
//! 4. **Events**: Server broadcasts round, timer and result events
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: handshake, optional `protocolVersion`
//! - **startNewGame**: `mode` (`classic`, `timeAttack`, `mapFinder`), optional `timer` and `rounds`
//! - **placeGuess**: marker position `x`, `y` in display coordinates
//! - **submitNameGuess**: typed map name `text`
//! - **skip**, **advance**, **reset**
//! - **getScores**: stored best score of every mode, allowed in any phase
//!
//! ## Server → Client
//!
//! - **welcome**, **ack**, **error** (`code`, `message`, `recoverable`)
//! - **scores**: `bestScores` keyed by mode, the reply to `getScores`
//! - **roundLoaded**: `index`, `count`, `mapId`, `hintRef`, `timer`
//! - **timerTick**: `remaining` seconds
//! - **roundResolved**: `points`, `totalScore`, `solution`, `distance`, `correct`
//! - **finished**: `totalScore`, `bestScore`, `newRecord`, per-round results
//!
//! # Environment Variables
//!
//! - `GUESSR_HOST`: Bind address (default: "127.0.0.1")
//! - `GUESSR_PORT`: Port number (default: 7878)
//! - `GUESSR_MAX_PENDING`: Command queue depth (default: 16)
//! - `GUESSR_MAPS`, `GUESSR_ROUNDS`: map list and round pool files
//! - `GUESSR_SCORES`: score file (default: platform data dir)
//! - `GUESSR_DISPLAY_SIZE`: minimap pixel size (default: 256)
//! - `GUESSR_SEED`: fixed round shuffle seed
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"protocolVersion":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"protocolVersion":"1.0.0",...}
//! Client -> Server: {"type":"startNewGame","seq":2,"mode":"classic"}
//! Server -> Client: {"type":"ack","seq":2,"status":"ok",...}
//! Server -> Client: {"type":"roundLoaded","seq":1,"index":0,"count":5,"mapId":"narva",...}
//! Client -> Server: {"type":"placeGuess","seq":3,"x":120.5,"y":-88.0}
//! Server -> Client: {"type":"ack","seq":3,...}
//! Server -> Client: {"type":"roundResolved","seq":2,"points":80,"totalScore":80,...}
//! ```

pub mod config;
pub mod controller;
pub mod maps;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod source;
pub mod store;
pub mod timer;

pub use squad_guessr_core as core;
pub use squad_guessr_types as types;

pub use config::{AppConfig, ServerConfig};
pub use controller::{ClientCommand, Controller, InboundCommand, OutboundMessage};
pub use maps::{load_maps, parse_maps};
pub use protocol::{parse_message, ErrorCode, ParsedMessage, ServerMessage};
pub use runtime::run_game_server;
pub use server::run_server;
pub use source::{decode_rounds, FileRoundSource, RoundSource, StaticRoundSource};
pub use store::{default_scores_path, open_file_scores, FileHighScores, JsonFileBackend};
pub use timer::TimerHandle;
