//! Map reference data.
//!
//! Loaded once at startup and shared read-only with every session. Metadata is
//! not validated on insertion: a map with a broken extent only fails the round
//! that uses it (see [`CoordinateTransform::new`](crate::transform::CoordinateTransform::new)).

use std::collections::HashMap;

use crate::error::{Result, SessionError};
use crate::types::{WorldSize, DEFAULT_DISPLAY_SIZE};

#[derive(Debug, Clone, PartialEq)]
pub struct MapMetadata {
    pub id: String,
    /// Name the player has to type in MapFinder.
    pub name: String,
    pub world_size: WorldSize,
    /// Square pixel extent of the minimap for this map.
    pub display_size: f64,
}

impl MapMetadata {
    pub fn new(id: impl Into<String>, world_size: WorldSize) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            world_size,
            display_size: DEFAULT_DISPLAY_SIZE,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_display_size(mut self, display_size: f64) -> Self {
        self.display_size = display_size;
        self
    }
}

/// Lookup table keyed by lowercase map id.
#[derive(Debug, Clone, Default)]
pub struct MapRegistry {
    maps: HashMap<String, MapMetadata>,
}

impl MapRegistry {
    pub fn new(maps: impl IntoIterator<Item = MapMetadata>) -> Self {
        let mut registry = Self::default();
        for map in maps {
            registry.insert(map);
        }
        registry
    }

    /// Insert or replace a map. Returns the previous entry with the same id.
    pub fn insert(&mut self, map: MapMetadata) -> Option<MapMetadata> {
        self.maps.insert(map.id.to_lowercase(), map)
    }

    /// Case-insensitive lookup, as round sources do not agree on casing.
    pub fn get(&self, id: &str) -> Result<&MapMetadata> {
        self.maps
            .get(&id.to_lowercase())
            .ok_or_else(|| SessionError::UnknownMap(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.maps.contains_key(&id.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Maps sorted by id.
    pub fn iter_sorted(&self) -> Vec<&MapMetadata> {
        let mut maps: Vec<&MapMetadata> = self.maps.values().collect();
        maps.sort_by(|a, b| a.id.cmp(&b.id));
        maps
    }
}
