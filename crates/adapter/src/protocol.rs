//! Protocol module - JSON message types for UI clients
//!
//! Line-delimited JSON. Every message carries `type` and `seq`; server
//! messages add `ts` (milliseconds since the epoch). Replies (`welcome`, `ack`,
//! `error`, `scores`) echo the client's `seq`, game events carry the server's
//! own sequence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{Advance, GameSummary, Resolution, RoundView, SessionError};
use crate::types::{DisplayPoint, GameMode, WorldPoint};

// ============== Client -> Server Messages ==============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartNewGameMessage {
    pub seq: u64,
    pub mode: String,
    /// Countdown seconds; mode default when absent, 0 disables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceGuessMessage {
    pub seq: u64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameGuessMessage {
    pub seq: u64,
    pub text: String,
}

/// Messages with no payload besides `seq`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BareMessage {
    pub seq: u64,
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    StartNewGame(StartNewGameMessage),
    PlaceGuess(PlaceGuessMessage),
    SubmitNameGuess(NameGuessMessage),
    Skip(BareMessage),
    Advance(BareMessage),
    Reset(BareMessage),
    GetScores(BareMessage),
    Unknown { seq: u64, msg_type: String },
}

impl ParsedMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ParsedMessage::Hello(m) => m.seq,
            ParsedMessage::StartNewGame(m) => m.seq,
            ParsedMessage::PlaceGuess(m) => m.seq,
            ParsedMessage::SubmitNameGuess(m) => m.seq,
            ParsedMessage::Skip(m)
            | ParsedMessage::Advance(m)
            | ParsedMessage::Reset(m)
            | ParsedMessage::GetScores(m) => m.seq,
            ParsedMessage::Unknown { seq, .. } => *seq,
        }
    }
}

const KNOWN_TYPES: [&str; 8] = [
    "hello",
    "startNewGame",
    "placeGuess",
    "submitNameGuess",
    "skip",
    "advance",
    "reset",
    "getScores",
];

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type", rename_all = "camelCase")]
    enum InboundMessage {
        Hello(HelloMessage),
        StartNewGame(StartNewGameMessage),
        PlaceGuess(PlaceGuessMessage),
        SubmitNameGuess(NameGuessMessage),
        Skip(BareMessage),
        Advance(BareMessage),
        Reset(BareMessage),
        GetScores(BareMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::StartNewGame(m)) => Ok(ParsedMessage::StartNewGame(m)),
        Ok(InboundMessage::PlaceGuess(m)) => Ok(ParsedMessage::PlaceGuess(m)),
        Ok(InboundMessage::SubmitNameGuess(m)) => Ok(ParsedMessage::SubmitNameGuess(m)),
        Ok(InboundMessage::Skip(m)) => Ok(ParsedMessage::Skip(m)),
        Ok(InboundMessage::Advance(m)) => Ok(ParsedMessage::Advance(m)),
        Ok(InboundMessage::Reset(m)) => Ok(ParsedMessage::Reset(m)),
        Ok(InboundMessage::GetScores(m)) => Ok(ParsedMessage::GetScores(m)),
        Err(e) => {
            // An unknown type is answered with an error, not dropped as garbage.
            #[derive(Debug, Deserialize)]
            struct Header {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            let msg_type = header.msg_type.unwrap_or_else(|| "unknown".to_string());
            if KNOWN_TYPES.contains(&msg_type.as_str()) {
                return Err(e);
            }
            Ok(ParsedMessage::Unknown {
                seq: header.seq.unwrap_or(0),
                msg_type,
            })
        }
    }
}

/// Pull `seq` out of a line that failed to parse, if it is still visible.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "backpressure")]
    Backpressure,
    #[serde(rename = "ordering_error")]
    OrderingError,
    #[serde(rename = "round_fetch_failed")]
    RoundFetchFailed,
    #[serde(rename = "unknown_map")]
    UnknownMap,
    #[serde(rename = "invalid_map_metadata")]
    InvalidMapMetadata,
    #[serde(rename = "malformed_round")]
    MalformedRound,
    #[serde(rename = "guess_mismatch")]
    GuessMismatch,
    #[serde(rename = "store_error")]
    StoreError,
}

impl From<&SessionError> for ErrorCode {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::InvalidMapMetadata { .. } => ErrorCode::InvalidMapMetadata,
            SessionError::UnknownMap(_) => ErrorCode::UnknownMap,
            SessionError::RoundFetchFailed(_) => ErrorCode::RoundFetchFailed,
            SessionError::OrderingError { .. } => ErrorCode::OrderingError,
            SessionError::MalformedRound { .. } => ErrorCode::MalformedRound,
            SessionError::GuessMismatch { .. } => ErrorCode::GuessMismatch,
            SessionError::Store(_) => ErrorCode::StoreError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<WorldPoint> for Point {
    fn from(p: WorldPoint) -> Self {
        Point { x: p.x, y: p.y }
    }
}

impl From<DisplayPoint> for Point {
    fn from(p: DisplayPoint) -> Self {
        Point { x: p.x, y: p.y }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMessage {
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub game_id: String,
    pub client_id: u64,
    pub modes: Vec<String>,
    pub maps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckMessage {
    pub seq: u64,
    pub ts: u64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
    /// Whether starting a new game again may succeed.
    #[serde(default)]
    pub recoverable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundLoadedMessage {
    pub seq: u64,
    pub ts: u64,
    pub mode: String,
    pub index: usize,
    pub count: usize,
    pub map_id: String,
    pub hint_ref: String,
    /// Countdown length, present only when a timer runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerTickMessage {
    pub seq: u64,
    pub ts: u64,
    pub index: usize,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResolvedMessage {
    pub seq: u64,
    pub ts: u64,
    pub index: usize,
    pub points: u32,
    pub total_score: u32,
    pub map_name: String,
    pub solution: Point,
    pub solution_display: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guess: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    pub timed_out: bool,
    pub is_last: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub map_id: String,
    pub hint_ref: String,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedMessage {
    pub seq: u64,
    pub ts: u64,
    pub mode: String,
    pub total_score: u32,
    pub best_score: u32,
    pub previous_best: u32,
    pub new_record: bool,
    pub rounds: Vec<RoundResult>,
}

/// Stored best score per mode, keyed by the mode's wire name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoresMessage {
    pub seq: u64,
    pub ts: u64,
    pub best_scores: BTreeMap<String, u32>,
}

/// Everything the server writes to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    RoundLoaded(RoundLoadedMessage),
    TimerTick(TimerTickMessage),
    RoundResolved(RoundResolvedMessage),
    Finished(FinishedMessage),
    Scores(ScoresMessage),
}

// ============== Utility Functions ==============

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    maps: Vec<String>,
) -> WelcomeMessage {
    WelcomeMessage {
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        game_id: "squad-guessr".to_string(),
        client_id,
        modes: GameMode::ALL.iter().map(|m| m.as_str().to_string()).collect(),
        maps,
    }
}

pub fn best_scores(seq: u64, bests: &[(GameMode, u32)]) -> ScoresMessage {
    ScoresMessage {
        seq,
        ts: current_timestamp_ms(),
        best_scores: bests
            .iter()
            .map(|(mode, score)| (mode.as_str().to_string(), *score))
            .collect(),
    }
}

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        seq,
        ts: current_timestamp_ms(),
        status: "ok".to_string(),
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
        recoverable: false,
    }
}

pub fn session_error(seq: u64, err: &SessionError) -> ErrorMessage {
    ErrorMessage {
        recoverable: err.is_recoverable(),
        ..create_error(seq, ErrorCode::from(err), &err.to_string())
    }
}

pub fn round_loaded(seq: u64, view: &RoundView) -> RoundLoadedMessage {
    RoundLoadedMessage {
        seq,
        ts: current_timestamp_ms(),
        mode: view.mode.as_str().to_string(),
        index: view.index,
        count: view.round_count,
        map_id: view.map_id.clone(),
        hint_ref: view.hint_ref.clone(),
        timer: view.timer.map(|_| view.timer_secs),
    }
}

pub fn timer_tick(seq: u64, index: usize, remaining: u32) -> TimerTickMessage {
    TimerTickMessage {
        seq,
        ts: current_timestamp_ms(),
        index,
        remaining,
    }
}

pub fn round_resolved(seq: u64, r: &Resolution) -> RoundResolvedMessage {
    RoundResolvedMessage {
        seq,
        ts: current_timestamp_ms(),
        index: r.index,
        points: r.points,
        total_score: r.total_score,
        map_name: r.map_name.clone(),
        solution: r.solution.into(),
        solution_display: r.solution_display.into(),
        guess: r.guess_display.map(Point::from),
        distance: r.distance,
        distance_text: r.distance_text.clone(),
        correct: r.correct,
        timed_out: r.timed_out,
        is_last: r.is_last,
    }
}

pub fn finished(seq: u64, summary: &GameSummary) -> FinishedMessage {
    FinishedMessage {
        seq,
        ts: current_timestamp_ms(),
        mode: summary.mode.as_str().to_string(),
        total_score: summary.total_score,
        best_score: summary.best_score,
        previous_best: summary.previous_best,
        new_record: summary.new_record,
        rounds: summary
            .rounds
            .iter()
            .map(|r| RoundResult {
                map_id: r.map_id.clone(),
                hint_ref: r.hint_ref.clone(),
                points: r.points,
            })
            .collect(),
    }
}

/// Event announcing what follows a resolved round.
pub fn advance_event(seq: u64, advance: &Advance) -> ServerMessage {
    match advance {
        Advance::Next(view) => ServerMessage::RoundLoaded(round_loaded(seq, view)),
        Advance::Finished(summary) => ServerMessage::Finished(finished(seq, summary)),
    }
}

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
