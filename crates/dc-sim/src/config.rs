//! TOML loading for [`DashboardConfig`].
//!
//! Keys mirror the struct fields; anything left out keeps its default.
//!
//! ```toml
//! seed               = 7
//! travel_duration_ms = 2500
//!
//! [default_center]
//! lat = 40.7128
//! lng = -74.0060
//! ```

use std::path::Path;

use dc_core::DashboardConfig;

use crate::{SimError, SimResult};

/// Parse and validate a config from TOML text.
pub fn parse_config(text: &str) -> SimResult<DashboardConfig> {
    let config: DashboardConfig = toml::from_str(text)?;
    config.validate().map_err(|e| SimError::Config(e.to_string()))?;
    Ok(config)
}

/// Read, parse and validate a config file.
pub fn load_config(path: &Path) -> SimResult<DashboardConfig> {
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}
