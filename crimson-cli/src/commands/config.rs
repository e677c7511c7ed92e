//! Config command implementation - print or write the default configuration

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::CliError;

pub fn execute(config: &Config, example: bool, output: Option<PathBuf>) -> Result<()> {
    let content = if example {
        Config::example_toml()?
    } else {
        toml::to_string_pretty(config)
            .map_err(CliError::from)
            .context("Failed to serialize configuration")?
    };

    match output {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;
            log::info!("Wrote configuration to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
            handle.flush()?;
        }
    }
    Ok(())
}
