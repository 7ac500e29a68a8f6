use std::str::FromStr;

use anchor_client::solana_sdk::pubkey::Pubkey;
use anyhow::{anyhow, Result};
use chrono::Utc;
use console::style;
pub use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;

use crate::config::data::MintSettings;

/// Current unix timestamp in seconds.
pub fn unix_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// The candy machine given on the command line takes precedence over the
/// one from the settings file.
pub fn resolve_candy_machine_id(
    candy_machine: Option<String>,
    settings: &MintSettings,
) -> Result<Pubkey> {
    match candy_machine {
        Some(candy_machine) => match Pubkey::from_str(&candy_machine) {
            Ok(candy_machine_id) => Ok(candy_machine_id),
            Err(_) => {
                let error = anyhow!("Failed to parse candy machine id: {}", candy_machine);
                error!("{:?}", error);
                Err(error)
            }
        },
        None => settings.candy_machine_id.ok_or_else(|| {
            anyhow!("Missing candy machine id: use --candy-machine or set 'candyMachineId'")
        }),
    }
}

pub fn spinner_with_style() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(120);
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "▹▹▹▹▹",
                "▸▹▹▹▹",
                "▹▸▹▹▹",
                "▹▹▸▹▹",
                "▹▹▹▸▹",
                "▹▹▹▹▸",
                "▪▪▪▪▪",
            ])
            .template("{spinner:.dim} {msg}"),
    );
    pb
}

pub fn print_with_style(indent: &str, key: &str, value: String) {
    println!(
        " {} {}",
        style(format!("{}:.. {}:", indent, key)).dim(),
        value
    );
}
