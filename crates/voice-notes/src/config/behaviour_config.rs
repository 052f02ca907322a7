use crate::config::default_seed_demo_notes;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Whether to start with the demo notes in the list.
    #[serde(default = "default_seed_demo_notes")]
    pub seed_demo_notes: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            seed_demo_notes: default_seed_demo_notes(),
        }
    }
}
