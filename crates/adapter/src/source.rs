//! Round sources.
//!
//! A source hands out a batch of raw records; validation happens in the
//! session. Records use camelCase keys, and the field names of the public
//! guess API (`map`, `lng`, `lat`, `url`) are accepted as aliases. A file may
//! hold a bare array or the API envelope `{"data": "<base64 JSON array>"}`.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tracing::debug;

use crate::core::{FetchError, RoundRecord, SimpleRng};

#[async_trait]
pub trait RoundSource: Send + Sync {
    /// Up to `count` records, in play order.
    async fn fetch_rounds(&self, count: usize) -> Result<Vec<RoundRecord>, FetchError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRound {
    #[serde(default, alias = "map")]
    map_id: String,
    #[serde(default, alias = "lng")]
    world_x: Option<f64>,
    #[serde(default, alias = "lat")]
    world_y: Option<f64>,
    #[serde(default, alias = "url")]
    hint_ref: String,
}

impl From<WireRound> for RoundRecord {
    fn from(w: WireRound) -> Self {
        RoundRecord {
            map_id: w.map_id,
            world_x: w.world_x,
            world_y: w.world_y,
            hint_ref: w.hint_ref,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoundPayload {
    Records(Vec<WireRound>),
    Envelope { data: String },
}

/// Decode a round file or API response body.
pub fn decode_rounds(body: &str) -> Result<Vec<RoundRecord>, FetchError> {
    let payload: RoundPayload = serde_json::from_str(body)
        .map_err(|e| FetchError::new(format!("invalid round payload: {e}")))?;

    let records = match payload {
        RoundPayload::Records(records) => records,
        RoundPayload::Envelope { data } => {
            let bytes = STANDARD
                .decode(data.trim())
                .map_err(|e| FetchError::new(format!("invalid base64 round data: {e}")))?;
            serde_json::from_slice(&bytes)
                .map_err(|e| FetchError::new(format!("invalid round data: {e}")))?
        }
    };

    Ok(records.into_iter().map(RoundRecord::from).collect())
}

fn time_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn draw(rng: &Mutex<SimpleRng>, pool: &[RoundRecord], count: usize) -> Vec<RoundRecord> {
    let picked = match rng.lock() {
        Ok(mut rng) => rng.pick_distinct(pool.len(), count),
        Err(poisoned) => poisoned.into_inner().pick_distinct(pool.len(), count),
    };
    picked.into_iter().map(|i| pool[i].clone()).collect()
}

/// In-memory pool; each fetch draws distinct records.
#[derive(Debug)]
pub struct StaticRoundSource {
    pool: Vec<RoundRecord>,
    rng: Mutex<SimpleRng>,
}

impl StaticRoundSource {
    pub fn new(pool: Vec<RoundRecord>, seed: Option<u32>) -> Self {
        Self {
            pool,
            rng: Mutex::new(SimpleRng::new(seed.unwrap_or_else(time_seed))),
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

#[async_trait]
impl RoundSource for StaticRoundSource {
    async fn fetch_rounds(&self, count: usize) -> Result<Vec<RoundRecord>, FetchError> {
        Ok(draw(&self.rng, &self.pool, count))
    }
}

/// Pool read from disk on every fetch, so the file can be edited while running.
#[derive(Debug)]
pub struct FileRoundSource {
    path: PathBuf,
    rng: Mutex<SimpleRng>,
}

impl FileRoundSource {
    pub fn new(path: impl Into<PathBuf>, seed: Option<u32>) -> Self {
        Self {
            path: path.into(),
            rng: Mutex::new(SimpleRng::new(seed.unwrap_or_else(time_seed))),
        }
    }
}

#[async_trait]
impl RoundSource for FileRoundSource {
    async fn fetch_rounds(&self, count: usize) -> Result<Vec<RoundRecord>, FetchError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::new(format!("{}: {}", self.path.display(), e)))?;
        let pool = decode_rounds(&body)?;
        debug!(path = %self.path.display(), pool = pool.len(), count, "round pool read");
        Ok(draw(&self.rng, &pool, count))
    }
}
