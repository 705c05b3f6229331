//! Configuration file generation.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use shared::config::client::ClientConfig;

/// Writes a default configuration file into `dir`.
///
/// # Arguments
/// * `format` - "yaml" or "json".
///
/// # Errors
/// Returns an error if the format is unsupported or if writing the file fails.
pub fn generate_config(format: &str, dir: &Path) -> Result<()> {
    let config = ClientConfig::with_defaults();
    let serialized = config
        .render(format)
        .with_context(|| format!("unsupported format '{format}', use 'yaml' or 'json'"))?;

    let path = dir.join(format!("config.{format}"));
    fs::write(&path, serialized).with_context(|| format!("failed to write {}", path.display()))?;

    println!("Configuration file '{}' generated successfully.", path.display());
    Ok(())
}
