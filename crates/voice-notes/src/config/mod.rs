mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod logging_config;
mod storage_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, config::Config, logging_config::LoggingConfig,
    storage_config::StorageConfig,
};

pub(crate) const DEFAULT_SEED_DEMO_NOTES: bool = true;
pub(crate) const DEFAULT_LOG_FILTER: &str = "voice_notes=debug,voice_notes_core=debug";

pub(crate) fn default_seed_demo_notes() -> bool {
    DEFAULT_SEED_DEMO_NOTES
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
