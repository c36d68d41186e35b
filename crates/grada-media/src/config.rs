use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_PROCESSING_MS: u64 = 200;

/// Tunables for [`FrameSourceAdapter`](crate::FrameSourceAdapter).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdapterConfig {
    /// Minimum time the processing signal stays raised after a successful load.
    pub min_processing_ms: u64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            min_processing_ms: DEFAULT_MIN_PROCESSING_MS,
        }
    }
}

impl AdapterConfig {
    pub fn min_processing(&self) -> Duration {
        Duration::from_millis(self.min_processing_ms)
    }
}
