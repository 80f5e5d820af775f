//! Core game logic module - pure, deterministic, and testable
//!
//! Everything the guessing game decides lives here: coordinate conversion,
//! scoring, fuzzy name matching, the round timer and the session state
//! machine. Nothing in this crate touches the network, the clock or the
//! filesystem; the adapter crate drives it with fetched rounds and timer ticks.
//!
//! # Module Structure
//!
//! - [`maps`]: map metadata and the registry shared by sessions
//! - [`transform`]: world space <-> minimap display space
//! - [`scoring`]: distance table scoring and name scoring
//! - [`fuzzy`]: Levenshtein distance and map name matching
//! - [`round`]: source records and validated rounds
//! - [`timer`]: generation-tagged countdown
//! - [`highscore`]: best score per mode over a key-value backend
//! - [`session`]: the game lifecycle
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use squad_guessr_core::{
//!     GameSession, GameSettings, Guess, MapMetadata, MapRegistry, MemoryHighScores, RoundRecord,
//! };
//! use squad_guessr_types::{DisplayPoint, GameMode, WorldSize};
//!
//! let maps = Arc::new(MapRegistry::new([MapMetadata::new("narva", WorldSize::square(3000.0))]));
//! let mut session = GameSession::new(maps, Box::new(MemoryHighScores::default()));
//!
//! let ticket = session.begin_new_game(GameSettings::new(GameMode::Classic)).unwrap();
//! let batch = vec![RoundRecord::new("narva", 1500.0, -1500.0, "/hints/1.jpg")];
//! session.complete_new_game(ticket, Ok(batch)).unwrap();
//!
//! let outcome = session.submit_guess(Guess::Location(DisplayPoint::new(128.0, -128.0))).unwrap();
//! assert_eq!(outcome.points, 100);
//! ```

pub mod error;
pub mod fuzzy;
pub mod highscore;
pub mod maps;
pub mod rng;
pub mod round;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod transform;

pub use squad_guessr_types as types;

pub use error::{FetchError, Result, SessionError, StoreError};
pub use highscore::{
    high_score_key, HighScoreStore, HighScores, MemoryBackend, MemoryHighScores, ScoreBackend,
};
pub use maps::{MapMetadata, MapRegistry};
pub use rng::SimpleRng;
pub use round::{Round, RoundRecord};
pub use scoring::{score_location, score_name, LocationScore, NameScore};
pub use session::{
    Advance, FetchTicket, GameSession, GameSettings, GameSummary, Guess, Resolution, RoundSummary,
    RoundView, TimerEvent,
};
pub use timer::{RoundTimer, TimerGeneration, TimerTick};
pub use transform::CoordinateTransform;
