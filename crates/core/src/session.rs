//! Game session module - round sequencing, scoring accumulation and lifecycle
//!
//! ```text
//!            begin_new_game ─┐
//!   Idle <───────────────────┘ (fetch pending, still Idle)
//!    │ complete_new_game(ok)
//!    v
//!  Playing ──submit_guess / timer expiry──> RoundResolved
//!    ^                                          │ advance_round
//!    └──────────── more rounds ─────────────────┤
//!                                               v
//!                                           Finished ──reset──> Idle
//! ```
//!
//! The session never performs I/O apart from the high score store it owns.
//! Fetching rounds is split into [`GameSession::begin_new_game`], which hands
//! out a [`FetchTicket`], and [`GameSession::complete_new_game`], which only
//! applies a result carrying the latest ticket. Every failing operation leaves
//! the session exactly as it was before the call.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{FetchError, Result, SessionError};
use crate::highscore::HighScoreStore;
use crate::maps::{MapMetadata, MapRegistry};
use crate::round::{rounds_from_records, Round, RoundRecord};
use crate::scoring::{format_distance, score_location, score_name};
use crate::timer::{RoundTimer, TimerGeneration, TimerTick};
use crate::transform::CoordinateTransform;
use crate::types::{DisplayPoint, GameMode, Phase, WorldPoint, DEFAULT_ROUND_COUNT};

/// Options chosen on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    pub mode: GameMode,
    pub round_count: usize,
    /// Countdown per round, 0 disables the timer.
    pub timer_secs: u32,
}

impl GameSettings {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            round_count: DEFAULT_ROUND_COUNT,
            timer_secs: mode.default_timer_secs(),
        }
    }

    pub fn with_rounds(mut self, round_count: usize) -> Self {
        self.round_count = round_count;
        self
    }

    pub fn with_timer(mut self, timer_secs: u32) -> Self {
        self.timer_secs = timer_secs;
        self
    }
}

/// Identity of one requested batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Player input for the current round.
#[derive(Debug, Clone, PartialEq)]
pub enum Guess {
    /// Marker position in display space, clamped before scoring.
    Location(DisplayPoint),
    /// Typed map name.
    Name(String),
    /// Skip, or the countdown ran out.
    NoGuess,
}

/// What the UI needs to present a freshly loaded round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundView {
    pub index: usize,
    pub round_count: usize,
    pub mode: GameMode,
    pub map_id: String,
    pub hint_ref: String,
    pub timer_secs: u32,
    pub timer: Option<TimerGeneration>,
}

/// Outcome of resolving a round.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub index: usize,
    pub points: u32,
    pub total_score: u32,
    pub map_name: String,
    pub solution: WorldPoint,
    /// Solution marker position on the minimap.
    pub solution_display: DisplayPoint,
    /// Clamped guess marker, location modes only.
    pub guess_display: Option<DisplayPoint>,
    pub distance: Option<f64>,
    pub distance_text: Option<String>,
    /// Score table step reached, location modes only.
    pub tier: Option<usize>,
    /// Name verdict, MapFinder only.
    pub correct: Option<bool>,
    pub timed_out: bool,
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub map_id: String,
    pub hint_ref: String,
    pub points: u32,
}

/// Immutable history handed to the results view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub mode: GameMode,
    pub total_score: u32,
    pub previous_best: u32,
    pub best_score: u32,
    pub new_record: bool,
    pub rounds: Vec<RoundSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next(RoundView),
    Finished(GameSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    Stale,
    Tick { remaining: u32 },
    /// The round was resolved with no guess, then advanced.
    Expired {
        resolution: Resolution,
        advance: Result<Advance>,
    },
}

#[derive(Debug, Clone, Copy)]
struct PendingFetch {
    ticket: FetchTicket,
    settings: GameSettings,
}

/// Map data resolved for the round being played.
#[derive(Debug, Clone)]
struct LoadedMap {
    meta: MapMetadata,
    transform: CoordinateTransform,
}

pub struct GameSession {
    maps: Arc<MapRegistry>,
    store: Box<dyn HighScoreStore>,
    settings: Option<GameSettings>,
    rounds: Vec<Round>,
    current_index: usize,
    total_score: u32,
    phase: Phase,
    timer: RoundTimer,
    current: Option<LoadedMap>,
    pending: Option<PendingFetch>,
    next_ticket: u64,
    best_score: u32,
    summary: Option<GameSummary>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("settings", &self.settings)
            .field("current_index", &self.current_index)
            .field("round_count", &self.rounds.len())
            .field("total_score", &self.total_score)
            .field("pending", &self.pending.map(|p| p.ticket))
            .finish()
    }
}

impl GameSession {
    pub fn new(maps: Arc<MapRegistry>, store: Box<dyn HighScoreStore>) -> Self {
        Self {
            maps,
            store,
            settings: None,
            rounds: Vec::new(),
            current_index: 0,
            total_score: 0,
            phase: Phase::Idle,
            timer: RoundTimer::new(),
            current: None,
            pending: None,
            next_ticket: 0,
            best_score: 0,
            summary: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.settings.map(|s| s.mode)
    }

    pub fn settings(&self) -> Option<GameSettings> {
        self.settings
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Best score for the active mode as read when the game started.
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    pub fn maps(&self) -> &MapRegistry {
        &self.maps
    }

    pub fn pending_ticket(&self) -> Option<FetchTicket> {
        self.pending.map(|p| p.ticket)
    }

    pub fn is_fetching(&self) -> bool {
        self.pending.is_some()
    }

    /// View of the round being played or just resolved.
    pub fn current_round(&self) -> Option<RoundView> {
        match self.phase {
            Phase::Playing | Phase::RoundResolved => self.round_view(),
            Phase::Idle | Phase::Finished => None,
        }
    }

    /// Read the stored best score of a mode.
    pub fn stored_best(&mut self, mode: GameMode) -> Result<u32> {
        Ok(self.store.read(mode)?)
    }

    /// Stored best of every mode, for a menu shown before any game.
    pub fn stored_bests(&mut self) -> Result<Vec<(GameMode, u32)>> {
        Ok(self.store.read_all()?)
    }

    fn ordering(&self, operation: &'static str) -> SessionError {
        SessionError::OrderingError {
            operation,
            phase: self.phase,
        }
    }

    /// Request a new batch. Only valid while Idle.
    ///
    /// A call while another fetch is outstanding supersedes it: the older
    /// ticket is forgotten and its result will be discarded.
    pub fn begin_new_game(&mut self, settings: GameSettings) -> Result<FetchTicket> {
        if self.phase != Phase::Idle {
            return Err(self.ordering("startNewGame"));
        }

        if let Some(prev) = self.pending {
            debug!(ticket = prev.ticket.0, "superseding outstanding round fetch");
        }

        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = FetchTicket(self.next_ticket);
        let settings = GameSettings {
            round_count: settings.round_count.max(1),
            ..settings
        };
        self.pending = Some(PendingFetch { ticket, settings });
        debug!(
            ticket = ticket.0,
            mode = settings.mode.as_str(),
            rounds = settings.round_count,
            "round fetch requested"
        );
        Ok(ticket)
    }

    /// Drop the outstanding fetch, if any.
    pub fn cancel_pending_fetch(&mut self) -> Option<FetchTicket> {
        self.pending.take().map(|p| {
            debug!(ticket = p.ticket.0, "round fetch cancelled");
            p.ticket
        })
    }

    /// Apply the result of a fetch.
    ///
    /// Returns `Ok(None)` when `ticket` is not the outstanding one; the result
    /// is dropped without touching the session.
    pub fn complete_new_game(
        &mut self,
        ticket: FetchTicket,
        result: std::result::Result<Vec<RoundRecord>, FetchError>,
    ) -> Result<Option<RoundView>> {
        match self.pending {
            Some(p) if p.ticket == ticket => {}
            _ => {
                warn!(ticket = ticket.0, "discarding stale round batch");
                return Ok(None);
            }
        }
        let Some(PendingFetch { settings, .. }) = self.pending.take() else {
            return Ok(None);
        };

        let mut records = result.map_err(|e| SessionError::RoundFetchFailed(e.0))?;
        if records.is_empty() {
            return Err(SessionError::RoundFetchFailed(
                "round source returned no rounds".to_string(),
            ));
        }
        records.truncate(settings.round_count);

        let rounds = rounds_from_records(records)?;
        let loaded = self.load_map(&rounds[0])?;

        let best = match self.store.read(settings.mode) {
            Ok(best) => best,
            Err(e) => {
                warn!(error = %e, "high score unavailable, assuming 0");
                0
            }
        };

        self.settings = Some(settings);
        self.rounds = rounds;
        self.current_index = 0;
        self.total_score = 0;
        self.current = Some(loaded);
        self.summary = None;
        self.best_score = best;
        self.phase = Phase::Playing;
        self.timer.arm(settings.timer_secs);

        info!(
            mode = settings.mode.as_str(),
            rounds = self.rounds.len(),
            best,
            "game started"
        );
        Ok(self.round_view())
    }

    /// Resolve the current round with the player's guess.
    pub fn submit_guess(&mut self, guess: Guess) -> Result<Resolution> {
        self.resolve_current(guess, false)
    }

    /// Move past a resolved round; the last one finishes the game.
    pub fn advance_round(&mut self) -> Result<Advance> {
        if self.phase != Phase::RoundResolved {
            return Err(self.ordering("advanceRound"));
        }

        let next = self.current_index + 1;
        if next >= self.rounds.len() {
            self.current_index = self.rounds.len();
            return Ok(Advance::Finished(self.finish()));
        }

        let loaded = self.load_map(&self.rounds[next])?;
        self.current_index = next;
        self.current = Some(loaded);
        self.phase = Phase::Playing;
        let secs = self.settings.map(|s| s.timer_secs).unwrap_or(0);
        self.timer.arm(secs);

        debug!(index = next, "round loaded");
        self.round_view()
            .map(Advance::Next)
            .ok_or_else(|| self.ordering("advanceRound"))
    }

    /// Deliver one countdown tick.
    pub fn timer_tick(&mut self, generation: TimerGeneration) -> Result<TimerEvent> {
        if self.phase != Phase::Playing {
            return Ok(TimerEvent::Stale);
        }

        match self.timer.tick(generation) {
            TimerTick::Stale => Ok(TimerEvent::Stale),
            TimerTick::Remaining(remaining) => Ok(TimerEvent::Tick { remaining }),
            TimerTick::Expired => {
                debug!(index = self.current_index, "round timer expired");
                let resolution = self.resolve_current(Guess::NoGuess, true)?;
                let advance = self.advance_round();
                Ok(TimerEvent::Expired {
                    resolution,
                    advance,
                })
            }
        }
    }

    /// Return to the menu from any phase.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.pending = None;
        self.settings = None;
        self.rounds.clear();
        self.current_index = 0;
        self.total_score = 0;
        self.current = None;
        self.summary = None;
        self.phase = Phase::Idle;
        debug!("session reset");
    }

    fn load_map(&self, round: &Round) -> Result<LoadedMap> {
        let meta = self.maps.get(round.map_id())?.clone();
        let transform = CoordinateTransform::new(&meta)?;
        Ok(LoadedMap { meta, transform })
    }

    fn round_view(&self) -> Option<RoundView> {
        let settings = self.settings?;
        let round = self.rounds.get(self.current_index)?;
        Some(RoundView {
            index: self.current_index,
            round_count: self.rounds.len(),
            mode: settings.mode,
            map_id: round.map_id().to_string(),
            hint_ref: round.hint_ref().to_string(),
            timer_secs: settings.timer_secs,
            timer: self.timer.generation(),
        })
    }

    fn resolve_current(&mut self, guess: Guess, timed_out: bool) -> Result<Resolution> {
        if self.phase != Phase::Playing {
            return Err(self.ordering("submitGuess"));
        }
        let (Some(settings), Some(loaded)) = (self.settings, self.current.as_ref()) else {
            return Err(self.ordering("submitGuess"));
        };
        let Some(round) = self.rounds.get(self.current_index) else {
            return Err(self.ordering("submitGuess"));
        };
        if round.is_resolved() {
            return Err(self.ordering("submitGuess"));
        }

        let solution = round.true_position();
        let mut outcome = Resolution {
            index: self.current_index,
            points: 0,
            total_score: self.total_score,
            map_name: loaded.meta.name.clone(),
            solution,
            solution_display: loaded.transform.world_to_display(solution),
            guess_display: None,
            distance: None,
            distance_text: None,
            tier: None,
            correct: None,
            timed_out,
            is_last: self.current_index + 1 == self.rounds.len(),
        };

        match (guess, settings.mode.scores_location()) {
            (Guess::Location(raw), true) => {
                let display = loaded.transform.clamp(raw);
                let world = loaded.transform.display_to_world(display);
                let score = score_location(world.distance_to(solution), loaded.meta.world_size.x);
                outcome.points = score.points;
                outcome.guess_display = Some(display);
                outcome.distance = Some(score.distance);
                outcome.distance_text = Some(format_distance(score.distance));
                outcome.tier = score.tier;
            }
            (Guess::Name(text), false) => {
                let score = score_name(&text, &loaded.meta.name);
                outcome.points = score.points;
                outcome.correct = Some(score.correct);
            }
            (Guess::NoGuess, scores_location) => {
                if !scores_location {
                    outcome.correct = Some(false);
                }
            }
            (Guess::Location(_), false) | (Guess::Name(_), true) => {
                return Err(SessionError::GuessMismatch {
                    mode: settings.mode,
                });
            }
        }

        let index = self.current_index;
        if !self.rounds[index].resolve(outcome.points) {
            return Err(self.ordering("submitGuess"));
        }
        self.total_score = self.total_score.saturating_add(outcome.points);
        outcome.total_score = self.total_score;
        self.timer.cancel();
        self.phase = Phase::RoundResolved;

        debug!(
            index,
            points = outcome.points,
            total = self.total_score,
            timed_out,
            "round resolved"
        );
        Ok(outcome)
    }

    fn finish(&mut self) -> GameSummary {
        self.timer.cancel();
        self.current = None;
        self.phase = Phase::Finished;

        let mode = self.settings.map(|s| s.mode).unwrap_or(GameMode::Classic);
        let previous_best = self.best_score;
        let new_record = match self.store.write_if_greater(mode, self.total_score) {
            Ok(written) => written,
            Err(e) => {
                warn!(error = %e, "could not persist high score");
                false
            }
        };
        if new_record {
            self.best_score = self.total_score;
        }

        let summary = GameSummary {
            mode,
            total_score: self.total_score,
            previous_best,
            best_score: self.best_score,
            new_record,
            rounds: self
                .rounds
                .iter()
                .map(|r| RoundSummary {
                    map_id: r.map_id().to_string(),
                    hint_ref: r.hint_ref().to_string(),
                    points: r.points_awarded().unwrap_or(0),
                })
                .collect(),
        };
        info!(
            mode = mode.as_str(),
            total = self.total_score,
            new_record,
            "game finished"
        );
        self.summary = Some(summary.clone());
        summary
    }
}
