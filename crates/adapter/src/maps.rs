//! Map reference data loading.
//!
//! ```json
//! [
//!   { "id": "narva", "name": "Narva", "size": 3000 },
//!   { "id": "harju", "size": 4000, "sizeY": 3200 }
//! ]
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::core::{MapMetadata, MapRegistry};
use crate::types::WorldSize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapEntry {
    id: String,
    #[serde(default)]
    name: Option<String>,
    size: f64,
    #[serde(default)]
    size_y: Option<f64>,
}

impl MapEntry {
    fn into_metadata(self, display_size: f64) -> MapMetadata {
        let world = WorldSize::new(self.size, self.size_y.unwrap_or(self.size));
        let meta = MapMetadata::new(self.id, world).with_display_size(display_size);
        match self.name {
            Some(name) if !name.trim().is_empty() => meta.with_name(name),
            _ => meta,
        }
    }
}

/// Parse a map list, applying the minimap display size to every entry.
pub fn parse_maps(json: &str, display_size: f64) -> anyhow::Result<MapRegistry> {
    let entries: Vec<MapEntry> = serde_json::from_str(json).context("invalid map list")?;
    Ok(MapRegistry::new(
        entries.into_iter().map(|e| e.into_metadata(display_size)),
    ))
}

pub fn load_maps(path: &Path, display_size: f64) -> anyhow::Result<MapRegistry> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read map list {}", path.display()))?;
    let registry = parse_maps(&json, display_size)
        .with_context(|| format!("failed to load {}", path.display()))?;
    info!(path = %path.display(), maps = registry.len(), "maps loaded");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maps_defaults() {
        let json = r#"[
            {"id": "narva", "name": "Narva", "size": 3000},
            {"id": "harju", "size": 4000, "sizeY": 3200}
        ]"#;
        let registry = parse_maps(json, 512.0).unwrap();
        assert_eq!(registry.len(), 2);

        let narva = registry.get("narva").unwrap();
        assert_eq!(narva.name, "Narva");
        assert_eq!(narva.world_size, WorldSize::square(3000.0));
        assert_eq!(narva.display_size, 512.0);

        let harju = registry.get("Harju").unwrap();
        assert_eq!(harju.name, "harju");
        assert_eq!(harju.world_size, WorldSize::new(4000.0, 3200.0));
    }

    #[test]
    fn test_parse_maps_rejects_garbage() {
        assert!(parse_maps(r#"{"id": "narva"}"#, 256.0).is_err());
        assert!(parse_maps(r#"[{"id": "narva"}]"#, 256.0).is_err());
    }

    #[test]
    fn test_non_positive_size_is_kept_for_the_round_to_reject() {
        let registry = parse_maps(r#"[{"id": "void", "size": 0}]"#, 256.0).unwrap();
        assert!(registry.contains("void"));
    }
}
