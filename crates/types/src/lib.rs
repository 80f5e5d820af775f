//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, protocol adapter, tests).
//!
//! # Coordinate Spaces
//!
//! Two 2D spaces are involved in every round:
//!
//! - **World space**: native coordinates of the game map, in meters. The
//!   vertical axis grows downwards as negative values (`y <= 0`).
//! - **Display space**: pixels of the rendered minimap, a square of
//!   `display_size` pixels. Same orientation: `x` in `[0, extent]`,
//!   `y` in `[-extent, 0]`.
//!
//! # Score Table
//!
//! Reference thresholds are defined for a 3000m map and scaled linearly
//! for every other map size:
//!
//! | Max distance | Points |
//! |--------------|--------|
//! | 20 | 100 |
//! | 50 | 80 |
//! | 100 | 60 |
//! | 200 | 40 |
//! | 300 | 20 |
//! | 500 | 10 |
//!
//! # Examples
//!
//! ```
//! use squad_guessr_types::{GameMode, DEFAULT_ROUND_COUNT, SCORE_STEPS};
//!
//! let mode = GameMode::from_str("timeAttack").unwrap();
//! assert_eq!(mode, GameMode::TimeAttack);
//! assert_eq!(mode.as_str(), "timeAttack");
//! assert_eq!(mode.default_timer_secs(), 60);
//!
//! assert_eq!(DEFAULT_ROUND_COUNT, 5);
//! assert_eq!(SCORE_STEPS[0].points, 100);
//! ```

/// Rounds requested per game.
pub const DEFAULT_ROUND_COUNT: usize = 5;

/// Largest batch a client may ask for.
pub const MAX_ROUND_COUNT: usize = 10;

/// Pixel extent of the square minimap in display space.
pub const DEFAULT_DISPLAY_SIZE: f64 = 256.0;

/// World size the reference score table is calibrated for.
pub const REFERENCE_WORLD_SIZE: f64 = 3000.0;

/// Points awarded for a correct map name.
pub const NAME_MATCH_POINTS: u32 = 100;

/// Largest edit distance still accepted as a correct map name.
pub const NAME_MATCH_MAX_DISTANCE: usize = 2;

/// Round timer tick interval in milliseconds.
pub const TIMER_TICK_MS: u64 = 1000;

/// Countdown used by TimeAttack when the UI does not override it.
pub const TIME_ATTACK_DEFAULT_SECS: u32 = 60;

/// One row of the location score table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStep {
    pub max_distance: f64,
    pub points: u32,
}

impl ScoreStep {
    pub const fn new(max_distance: f64, points: u32) -> Self {
        Self {
            max_distance,
            points,
        }
    }
}

/// Reference score table, ascending by `max_distance`.
pub const SCORE_STEPS: [ScoreStep; 6] = [
    ScoreStep::new(20.0, 100),
    ScoreStep::new(50.0, 80),
    ScoreStep::new(100.0, 60),
    ScoreStep::new(200.0, 40),
    ScoreStep::new(300.0, 20),
    ScoreStep::new(500.0, 10),
];

/// Game modes offered by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// Place a marker, no time limit.
    Classic,
    /// Place a marker against a countdown.
    TimeAttack,
    /// Type the map's name.
    MapFinder,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Classic, GameMode::TimeAttack, GameMode::MapFinder];

    /// Parse from the wire name (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("classic") {
            Some(Self::Classic)
        } else if s.eq_ignore_ascii_case("timeAttack") || s.eq_ignore_ascii_case("time_attack") {
            Some(Self::TimeAttack)
        } else if s.eq_ignore_ascii_case("mapFinder") || s.eq_ignore_ascii_case("map_finder") {
            Some(Self::MapFinder)
        } else {
            None
        }
    }

    /// Wire name, also used to build high score keys.
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::TimeAttack => "timeAttack",
            GameMode::MapFinder => "mapFinder",
        }
    }

    /// Whether rounds are scored by marker distance.
    pub fn scores_location(self) -> bool {
        !matches!(self, GameMode::MapFinder)
    }

    pub fn default_timer_secs(self) -> u32 {
        match self {
            GameMode::TimeAttack => TIME_ATTACK_DEFAULT_SECS,
            GameMode::Classic | GameMode::MapFinder => 0,
        }
    }
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Playing,
    RoundResolved,
    Finished,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Playing => "playing",
            Phase::RoundResolved => "roundResolved",
            Phase::Finished => "finished",
        }
    }
}

/// Point in world space (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in world units.
    pub fn distance_to(self, other: WorldPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Point in display space (minimap pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Extent of a map in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSize {
    pub x: f64,
    pub y: f64,
}

impl WorldSize {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn square(size: f64) -> Self {
        Self { x: size, y: size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_table_is_ascending() {
        for pair in SCORE_STEPS.windows(2) {
            assert!(pair[0].max_distance < pair[1].max_distance);
            assert!(pair[0].points > pair[1].points);
        }
    }

    #[test]
    fn game_mode_wire_names_round_trip() {
        for mode in GameMode::ALL {
            assert_eq!(GameMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(GameMode::from_str("CLASSIC"), Some(GameMode::Classic));
        assert_eq!(GameMode::from_str("timedMapFinder"), None);
    }

    #[test]
    fn only_map_finder_scores_by_name() {
        assert!(GameMode::Classic.scores_location());
        assert!(GameMode::TimeAttack.scores_location());
        assert!(!GameMode::MapFinder.scores_location());
    }

    #[test]
    fn world_distance_is_euclidean() {
        let a = WorldPoint::new(0.0, 0.0);
        let b = WorldPoint::new(30.0, -40.0);
        assert_eq!(a.distance_to(b), 50.0);
        assert_eq!(b.distance_to(a), 50.0);
    }
}
