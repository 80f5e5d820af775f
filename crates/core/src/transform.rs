//! Coordinate transform between world space and display space.
//!
//! Both spaces share orientation (x right, y negative going down), so every
//! conversion is a per-axis multiplication. Nothing is rounded here; rounding
//! only happens when points or distance text are presented.

use crate::error::{Result, SessionError};
use crate::maps::MapMetadata;
use crate::types::{DisplayPoint, WorldPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    extent: f64,
    game_to_display: f64,
    game_to_display_y: f64,
    display_to_game: f64,
    display_to_game_y: f64,
}

fn check_extent(map: &MapMetadata, value: f64, reason: &'static str) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SessionError::InvalidMapMetadata {
            map_id: map.id.clone(),
            reason,
        })
    }
}

impl CoordinateTransform {
    pub fn new(map: &MapMetadata) -> Result<Self> {
        check_extent(map, map.world_size.x, "world width must be > 0")?;
        check_extent(map, map.world_size.y, "world height must be > 0")?;
        check_extent(map, map.display_size, "display size must be > 0")?;

        let extent = map.display_size;
        Ok(Self {
            extent,
            game_to_display: extent / map.world_size.x,
            game_to_display_y: extent / map.world_size.y,
            display_to_game: map.world_size.x / extent,
            display_to_game_y: map.world_size.y / extent,
        })
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    pub fn game_to_display(&self) -> f64 {
        self.game_to_display
    }

    pub fn game_to_display_y(&self) -> f64 {
        self.game_to_display_y
    }

    pub fn display_to_game(&self) -> f64 {
        self.display_to_game
    }

    pub fn world_to_display(&self, p: WorldPoint) -> DisplayPoint {
        DisplayPoint::new(p.x * self.game_to_display, p.y * self.game_to_display_y)
    }

    pub fn display_to_world(&self, p: DisplayPoint) -> WorldPoint {
        WorldPoint::new(p.x * self.display_to_game, p.y * self.display_to_game_y)
    }

    /// Whether the point lies inside `[0, extent] x [-extent, 0]`.
    pub fn contains(&self, p: DisplayPoint) -> bool {
        (0.0..=self.extent).contains(&p.x) && (-self.extent..=0.0).contains(&p.y)
    }

    /// Force a display point onto the minimap.
    pub fn clamp(&self, p: DisplayPoint) -> DisplayPoint {
        let mut out = p;
        if out.x < 0.0 {
            out.x = 0.0;
        }
        if out.x > self.extent {
            out.x = self.extent;
        }
        if out.y > 0.0 {
            out.y = 0.0;
        }
        if out.y < -self.extent {
            out.y = -self.extent;
        }
        out
    }

    /// Clamp a raw display guess and convert it to world space.
    pub fn guess_to_world(&self, p: DisplayPoint) -> WorldPoint {
        self.display_to_world(self.clamp(p))
    }
}
