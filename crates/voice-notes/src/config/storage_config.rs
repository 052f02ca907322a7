use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where recordings are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for recorded WAV files.
    pub recordings_dir: PathBuf,
}
