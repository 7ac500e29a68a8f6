use std::{fs::File, path::Path};

use anyhow::Result;
use tracing::debug;

use crate::config::data::*;
use crate::config::errors::ConfigError;

pub fn get_mint_settings(config_path: &str) -> Result<MintSettings, ConfigError> {
    let f = match File::open(config_path) {
        Ok(f) => f,
        Err(_) => return Err(ConfigError::FileOpenError(config_path.to_string())),
    };

    let settings: MintSettings = match serde_json::from_reader(f) {
        Ok(settings) => settings,
        Err(err) => {
            return Err(ConfigError::ParseError(err.to_string()));
        }
    };
    Ok(settings)
}

/// Loads the settings file when it exists; a missing file means defaults.
pub fn load_mint_settings(config_path: &str) -> Result<MintSettings, ConfigError> {
    if Path::new(config_path).exists() {
        get_mint_settings(config_path)
    } else {
        debug!("No settings file at {}, using defaults", config_path);
        Ok(MintSettings::default())
    }
}
