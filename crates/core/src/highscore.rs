//! Best score per game mode.
//!
//! Values live in a string key-value backend under `topScore_<mode>`, one key
//! per mode. The backend only needs `get` and `set`; the read-default and
//! write-if-greater rules live in [`HighScores`].

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::types::GameMode;

/// Best score access used by the session.
pub trait HighScoreStore: Send {
    /// Stored best score; an unseen mode reads as 0 and that default is persisted.
    fn read(&mut self, mode: GameMode) -> Result<u32, StoreError>;

    /// Store `candidate` only if it beats the current value. Returns whether it did.
    fn write_if_greater(&mut self, mode: GameMode, candidate: u32) -> Result<bool, StoreError>;

    /// Snapshot of every mode, reading (and so initialising) each key.
    fn read_all(&mut self) -> Result<Vec<(GameMode, u32)>, StoreError> {
        GameMode::ALL
            .iter()
            .map(|&mode| self.read(mode).map(|score| (mode, score)))
            .collect()
    }
}

/// Raw string storage.
pub trait ScoreBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

pub fn high_score_key(mode: GameMode) -> String {
    format!("topScore_{}", mode.as_str())
}

/// Read a stored value; anything that is not a non-negative integer counts as 0.
fn parse_score(key: &str, raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(v) => v,
        Err(_) => {
            warn!(key, raw, "ignoring unparsable high score");
            0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HighScores<B> {
    backend: B,
}

impl<B: ScoreBackend> HighScores<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

}

impl<B: ScoreBackend> HighScoreStore for HighScores<B> {
    fn read(&mut self, mode: GameMode) -> Result<u32, StoreError> {
        let key = high_score_key(mode);
        match self.backend.get(&key)? {
            Some(raw) => Ok(parse_score(&key, &raw)),
            None => {
                self.backend.set(&key, "0".to_string())?;
                Ok(0)
            }
        }
    }

    fn write_if_greater(&mut self, mode: GameMode, candidate: u32) -> Result<bool, StoreError> {
        let key = high_score_key(mode);
        let current = self
            .backend
            .get(&key)?
            .map(|raw| parse_score(&key, &raw))
            .unwrap_or(0);

        if candidate > current {
            self.backend.set(&key, candidate.to_string())?;
            debug!(mode = mode.as_str(), current, candidate, "new high score");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Volatile backend for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl ScoreBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

pub type MemoryHighScores = HighScores<MemoryBackend>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_read_persists_default() {
        let mut scores = MemoryHighScores::default();
        assert_eq!(scores.read(GameMode::Classic).unwrap(), 0);
        assert_eq!(scores.backend().raw("topScore_classic"), Some("0"));
        assert_eq!(scores.backend().raw("topScore_mapFinder"), None);
    }

    #[test]
    fn test_write_if_greater_only_raises() {
        let mut scores = MemoryHighScores::default();
        assert!(scores.write_if_greater(GameMode::TimeAttack, 320).unwrap());
        assert!(!scores.write_if_greater(GameMode::TimeAttack, 320).unwrap());
        assert!(!scores.write_if_greater(GameMode::TimeAttack, 100).unwrap());
        assert_eq!(scores.read(GameMode::TimeAttack).unwrap(), 320);
        assert!(scores.write_if_greater(GameMode::TimeAttack, 321).unwrap());
        assert_eq!(scores.read(GameMode::TimeAttack).unwrap(), 321);
    }

    #[test]
    fn test_zero_never_counts_as_record() {
        let mut scores = MemoryHighScores::default();
        assert!(!scores.write_if_greater(GameMode::Classic, 0).unwrap());
    }

    #[test]
    fn test_garbage_value_reads_as_zero() {
        let mut backend = MemoryBackend::new();
        backend
            .set("topScore_classic", "not a number".to_string())
            .unwrap();
        let mut scores = HighScores::new(backend);
        assert_eq!(scores.read(GameMode::Classic).unwrap(), 0);
        assert!(scores.write_if_greater(GameMode::Classic, 1).unwrap());
        assert_eq!(scores.backend().raw("topScore_classic"), Some("1"));
    }

    #[test]
    fn test_modes_are_independent() {
        let mut scores = MemoryHighScores::default();
        scores.write_if_greater(GameMode::MapFinder, 500).unwrap();
        let all = scores.read_all().unwrap();
        assert_eq!(
            all,
            vec![
                (GameMode::Classic, 0),
                (GameMode::TimeAttack, 0),
                (GameMode::MapFinder, 500)
            ]
        );
    }
}
