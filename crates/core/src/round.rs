//! Rounds as delivered by a round source and as owned by a session.

use crate::error::{Result, SessionError};
use crate::types::WorldPoint;

/// Decoded source record, before validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoundRecord {
    pub map_id: String,
    pub world_x: Option<f64>,
    pub world_y: Option<f64>,
    /// Opaque reference to the hint image.
    pub hint_ref: String,
}

impl RoundRecord {
    pub fn new(map_id: impl Into<String>, x: f64, y: f64, hint_ref: impl Into<String>) -> Self {
        Self {
            map_id: map_id.into(),
            world_x: Some(x),
            world_y: Some(y),
            hint_ref: hint_ref.into(),
        }
    }
}

/// One guess-and-score cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    map_id: String,
    true_position: WorldPoint,
    hint_ref: String,
    points_awarded: Option<u32>,
}

impl Round {
    /// Validate a source record. `index` is its position in the batch.
    pub fn from_record(index: usize, record: RoundRecord) -> Result<Self> {
        if record.map_id.trim().is_empty() {
            return Err(SessionError::MalformedRound {
                index,
                field: "mapId",
            });
        }
        let x = record
            .world_x
            .filter(|v| v.is_finite())
            .ok_or(SessionError::MalformedRound {
                index,
                field: "worldX",
            })?;
        let y = record
            .world_y
            .filter(|v| v.is_finite())
            .ok_or(SessionError::MalformedRound {
                index,
                field: "worldY",
            })?;

        Ok(Self {
            map_id: record.map_id,
            true_position: WorldPoint::new(x, y),
            hint_ref: record.hint_ref,
            points_awarded: None,
        })
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn true_position(&self) -> WorldPoint {
        self.true_position
    }

    pub fn hint_ref(&self) -> &str {
        &self.hint_ref
    }

    pub fn points_awarded(&self) -> Option<u32> {
        self.points_awarded
    }

    pub fn is_resolved(&self) -> bool {
        self.points_awarded.is_some()
    }

    /// Record the outcome. Returns false if the round was already resolved.
    pub(crate) fn resolve(&mut self, points: u32) -> bool {
        if self.points_awarded.is_some() {
            return false;
        }
        self.points_awarded = Some(points);
        true
    }
}

/// Validate a whole batch, failing on the first malformed record.
pub fn rounds_from_records(records: Vec<RoundRecord>) -> Result<Vec<Round>> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| Round::from_record(i, r))
        .collect()
}
