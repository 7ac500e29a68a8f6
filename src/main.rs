use std::{
    fs::OpenOptions,
    path::PathBuf,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use anyhow::{anyhow, Result};
use candy_mint::{
    cli::{Cli, Commands},
    constants::{COMPLETE_EMOJI, ERROR_EMOJI},
    mint::{process_mint, MintArgs},
    status::{process_status, StatusArgs},
    watch::{process_watch, WatchArgs},
};
use clap::Parser;
use console::style;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{self, filter::LevelFilter, prelude::*, EnvFilter};

fn setup_logging(level: Option<EnvFilter>) -> Result<()> {
    // log in the current directory
    let log_path = PathBuf::from("candy-mint.log");

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(true)
        .open(&log_path)?;

    // user-provided level first, then RUST_LOG, then "trace"
    let env_filter = if let Some(filter) = level {
        filter
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"))
    };

    let formatting_layer = BunyanFormattingLayer::new("candy-mint".into(), file);
    let level_filter = LevelFilter::from_str(&env_filter.to_string())?;

    let subscriber = tracing_subscriber::registry()
        .with(formatting_layer.with_filter(level_filter))
        .with(JsonStorageLayer);

    set_global_default(subscriber)?;

    Ok(())
}

#[tokio::main(worker_threads = 4)]
async fn main() {
    match run().await {
        Ok(()) => {
            println!(
                "\n{}{}",
                COMPLETE_EMOJI,
                style("Command successful.").green().bold().dim()
            );
        }
        Err(err) => {
            println!(
                "\n{}{} {}",
                ERROR_EMOJI,
                style("Error running command (re-run needed):").red(),
                err,
            );
            // finished the program with an error code to the OS
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<()> {
    solana_logger::setup_with_default("solana=off");

    let cli = Cli::parse();

    if let Some(user_filter) = cli.log_level {
        let filter = match EnvFilter::from_str(&user_filter) {
            Ok(filter) => filter,
            Err(_) => {
                return Err(anyhow!(
                    "Invalid log level: {:?}.\n Valid levels are: trace, debug, info, warn, error.",
                    user_filter
                ))
            }
        };
        setup_logging(Some(filter))?;
    } else {
        setup_logging(None)?;
    }

    tracing::info!("Candy mint starting.");

    let interrupted = Arc::new(AtomicBool::new(true));
    let ctrl_handler = interrupted.clone();

    ctrlc::set_handler(move || {
        if ctrl_handler.load(Ordering::SeqCst) {
            // nothing to wind down
            println!(
                "\n\n{}{} Operation aborted.",
                ERROR_EMOJI,
                style("Error running command (re-run needed):").red(),
            );
            // finished the program with an error code to the OS
            std::process::exit(1);
        }
        // a running watch stops at its next tick
        ctrl_handler.store(true, Ordering::SeqCst);
    })?;

    match cli.command {
        Commands::Status {
            keypair,
            rpc_url,
            config,
            candy_machine,
            wallet,
        } => process_status(StatusArgs {
            keypair,
            rpc_url,
            config,
            candy_machine,
            wallet,
        })?,
        Commands::Watch {
            keypair,
            rpc_url,
            config,
            candy_machine,
            wallet,
        } => {
            process_watch(WatchArgs {
                keypair,
                rpc_url,
                config,
                candy_machine,
                wallet,
                interrupted: interrupted.clone(),
            })
            .await?
        }
        Commands::Mint {
            keypair,
            rpc_url,
            config,
            candy_machine,
        } => process_mint(MintArgs {
            keypair,
            rpc_url,
            config,
            candy_machine,
        })?,
    }

    Ok(())
}
