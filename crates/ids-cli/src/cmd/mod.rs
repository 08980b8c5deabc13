pub mod create_review;
pub mod query;

use anyhow::Context;
use ids_core::config::{Config, WarnLevel};
use std::path::Path;

/// Load `.ids/config.yaml`, log warning-level findings and refuse invalid
/// thresholds.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    let config = Config::load(root).context("failed to load config")?;
    for w in config.validate() {
        if w.level == WarnLevel::Warning {
            tracing::warn!("config: {}", w.message);
        }
    }
    config.ensure_valid()?;
    Ok(config)
}
