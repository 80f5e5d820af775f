//! Scoring module - location and map-name scoring rules
//!
//! Location rounds award points from a distance table calibrated for a 3000m
//! map. Thresholds scale with the map so a 50m miss on a small map costs the
//! same as a proportionally larger miss on a big one. Between two thresholds
//! points are interpolated linearly.
//!
//! Name rounds are all-or-nothing: 100 points when the closest word of the
//! guess is within two edits of the map name.

use arrayvec::ArrayVec;

use crate::fuzzy::name_distance;
use crate::types::{
    ScoreStep, NAME_MATCH_MAX_DISTANCE, NAME_MATCH_POINTS, REFERENCE_WORLD_SIZE, SCORE_STEPS,
};

/// Capacity for a scaled score table.
pub const MAX_SCORE_STEPS: usize = 8;

pub type ScoreTable = ArrayVec<ScoreStep, MAX_SCORE_STEPS>;

/// Result of scoring a location guess.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationScore {
    pub points: u32,
    /// World-space distance between guess and solution.
    pub distance: f64,
    /// Index of the first table step the distance falls under, if any.
    pub tier: Option<usize>,
}

/// Result of scoring a name guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameScore {
    pub points: u32,
    /// Effective edit distance.
    pub distance: usize,
    pub correct: bool,
}

/// Reference table scaled for a map of `world_size` units.
pub fn scaled_steps(world_size: f64) -> ScoreTable {
    let scale = world_size / REFERENCE_WORLD_SIZE;
    SCORE_STEPS
        .iter()
        .map(|s| ScoreStep::new(s.max_distance * scale, s.points))
        .collect()
}

/// Linear interpolation between the two steps bracketing `distance`.
///
/// Callers guarantee `steps[0].max_distance < distance <= steps[last].max_distance`.
pub fn interpolate_points(distance: f64, steps: &[ScoreStep]) -> u32 {
    for pair in steps.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if distance <= curr.max_distance {
            let distance_range = curr.max_distance - prev.max_distance;
            let points_range = f64::from(curr.points) - f64::from(prev.points);
            let into_range = distance - prev.max_distance;
            let points = f64::from(prev.points) + points_range * into_range / distance_range;
            return points.round().max(0.0) as u32;
        }
    }
    0
}

/// Points for a distance against an ascending score table.
pub fn location_points(distance: f64, steps: &[ScoreStep]) -> u32 {
    let (Some(first), Some(last)) = (steps.first(), steps.last()) else {
        return 0;
    };

    if distance <= first.max_distance {
        first.points
    } else if distance > last.max_distance {
        0
    } else {
        interpolate_points(distance, steps)
    }
}

/// Score a location guess on a map of `world_size` units.
pub fn score_location(distance: f64, world_size: f64) -> LocationScore {
    let steps = scaled_steps(world_size);
    LocationScore {
        points: location_points(distance, &steps),
        distance,
        tier: steps.iter().position(|s| distance <= s.max_distance),
    }
}

/// Score a typed map name.
pub fn score_name(guess: &str, true_name: &str) -> NameScore {
    let distance = name_distance(guess, true_name);
    let correct = distance <= NAME_MATCH_MAX_DISTANCE;
    NameScore {
        points: if correct { NAME_MATCH_POINTS } else { 0 },
        distance,
        correct,
    }
}

/// Human readable distance in meters.
pub fn format_distance(meters: f64) -> String {
    if meters < 10.0 {
        format!("{:.2}m", meters)
    } else if meters < 1000.0 {
        format!("{:.0}m", meters)
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}
