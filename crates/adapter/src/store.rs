//! JSON file score backend.
//!
//! The whole file is a flat `{ "topScore_classic": "120", ... }` object kept in
//! memory. Every `set` rewrites it through a temp file and an atomic rename.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::{HighScores, ScoreBackend, StoreError};

const APP_DIR: &str = "squad-guessr";
const FILE_NAME: &str = "scores.json";

/// `<data_dir>/squad-guessr/scores.json`
pub fn default_scores_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME))
}

#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

pub type FileHighScores = HighScores<JsonFileBackend>;

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {}", path.display(), e))
}

impl JsonFileBackend {
    /// Load the file, or start empty when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(io_error(&path, e)),
        };
        debug!(path = %path.display(), entries = values.len(), "score file loaded");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
        }

        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let tmp_path = self.temp_path();
        let mut tmp_file = File::create(&tmp_path).map_err(|e| io_error(&tmp_path, e))?;
        tmp_file
            .write_all(json.as_bytes())
            .and_then(|_| tmp_file.sync_all())
            .map_err(|e| io_error(&tmp_path, e))?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

impl ScoreBackend for JsonFileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let previous = self.values.insert(key.to_string(), value);
        if let Err(e) = self.save() {
            // Keep memory in line with what is on disk.
            match previous {
                Some(v) => self.values.insert(key.to_string(), v),
                None => self.values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// Open the file store at `path`, or at the default location.
pub fn open_file_scores(path: Option<PathBuf>) -> Result<FileHighScores, StoreError> {
    let path = path
        .or_else(default_scores_path)
        .ok_or_else(|| StoreError::Io("no data directory for the score file".to_string()))?;
    Ok(HighScores::new(JsonFileBackend::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HighScoreStore;
    use crate::types::GameMode;

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::open(dir.path().join("scores.json")).unwrap();
        assert_eq!(backend.get("topScore_classic").unwrap(), None);
    }

    #[test]
    fn set_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");
        let mut backend = JsonFileBackend::open(&path).unwrap();
        backend.set("topScore_classic", "40".to_string()).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join("scores.json.tmp").exists());
        let raw: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("topScore_classic").map(String::as_str), Some("40"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileBackend::open(&path),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn scores_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut scores = open_file_scores(Some(path.clone())).unwrap();
        assert!(scores.write_if_greater(GameMode::MapFinder, 300).unwrap());
        drop(scores);

        let mut scores = open_file_scores(Some(path)).unwrap();
        assert_eq!(scores.read(GameMode::MapFinder).unwrap(), 300);
        assert!(!scores.write_if_greater(GameMode::MapFinder, 200).unwrap());
    }
}
