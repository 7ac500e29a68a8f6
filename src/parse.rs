use std::{env, fs::File, path::Path};

use crate::config::data::*;

/// Reads the Solana CLI config (`~/.config/solana/cli/config.yml`), if any.
pub fn parse_solana_config() -> Option<SolanaConfig> {
    let home = if cfg!(windows) {
        let drive = env::var_os("HOMEDRIVE")?;
        let path = env::var_os("HOMEPATH")?;
        Path::new(&drive).join(&path).as_os_str().to_owned()
    } else {
        env::var_os("HOME")?
    };

    let config_path = Path::new(&home)
        .join(".config")
        .join("solana")
        .join("cli")
        .join("config.yml");

    let conf_file = match File::open(config_path) {
        Ok(f) => f,
        Err(_) => return None,
    };
    serde_yaml::from_reader(&conf_file).ok()
}
