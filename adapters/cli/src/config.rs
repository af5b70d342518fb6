//! Loading of the optional TOML configuration file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use terraform_core::TerraformConfig;

/// Reads and validates the configuration at `path`, or returns the defaults.
///
/// Sections missing from the file fall back to their defaults.
pub(crate) fn load(path: Option<&Path>) -> Result<TerraformConfig> {
    let Some(path) = path else {
        log::debug!("no configuration file given, using defaults");
        return Ok(TerraformConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;
    let config = parse(&contents)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    log::info!("loaded configuration from {}", path.display());
    Ok(config)
}

fn parse(contents: &str) -> Result<TerraformConfig> {
    let config: TerraformConfig =
        toml::from_str(contents).context("failed to parse configuration")?;
    config.validate()?;
    Ok(config)
}
