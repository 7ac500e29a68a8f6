use std::str::FromStr;

use anchor_client::solana_sdk::{pubkey::Pubkey, signature::Signer};
use anyhow::{anyhow, Result};
use console::style;
use tracing::{info, warn};

use crate::{
    config::{load_mint_settings, MintSettings},
    constants::*,
    errors::SetupError,
    fetch::{fetch_snapshot, RpcFetcher},
    parse::parse_solana_config,
    refresh::{RefreshOutcome, RefreshTrigger, StatusTracker},
    setup::{read_keypair, resolve_keypair_path, resolve_rpc_url, setup_rpc_client},
    status::render::{print_page, print_sale_details},
    utils::*,
};

pub struct StatusArgs {
    pub keypair: Option<String>,
    pub rpc_url: Option<String>,
    pub config: String,
    pub candy_machine: Option<String>,
    pub wallet: Option<String>,
}

pub fn process_status(args: StatusArgs) -> Result<()> {
    let settings = load_mint_settings(&args.config)?;
    let candy_machine_id = resolve_candy_machine_id(args.candy_machine, &settings)?;
    let wallet = view_wallet(args.wallet, args.keypair, &settings)?;
    let rpc_url = resolve_rpc_url(args.rpc_url, &settings, parse_solana_config().as_ref());

    println!(
        "{} {}Looking up candy machine",
        style("[1/2]").bold().dim(),
        LOOKING_GLASS_EMOJI
    );

    let pb = spinner_with_style();
    pb.set_message("Connecting...");

    let fetcher = RpcFetcher::new(setup_rpc_client(&rpc_url), settings.spl_token_decimals);
    let mut tracker = StatusTracker::new(wallet);

    let ticket = tracker.begin(RefreshTrigger::Startup);
    let result = fetch_snapshot(&fetcher, &candy_machine_id, wallet.as_ref());
    let now = unix_timestamp();

    match tracker.complete(ticket, result, now) {
        RefreshOutcome::Applied { .. } => pb.finish_and_clear(),
        RefreshOutcome::Retained(err) => {
            pb.finish_with_message(format!("{}", style("Connection failed").red().bold()));
            return Err(err.into());
        }
        RefreshOutcome::Superseded => {
            pb.finish_and_clear();
            return Err(anyhow!("Status lookup was superseded"));
        }
    }

    let (snapshot, status) = match (tracker.snapshot(), tracker.status()) {
        (Some(snapshot), Some(status)) => (snapshot, status),
        _ => return Err(anyhow!("No status available for {}", candy_machine_id)),
    };

    print_sale_details(&candy_machine_id, &snapshot.sale);

    println!(
        "\n{} {}Mint page",
        style("[2/2]").bold().dim(),
        COMPUTER_EMOJI
    );
    print_page(snapshot, status, now);

    info!(
        "Status of {}: active={} ended={} sold_out={} remaining={}",
        candy_machine_id,
        status.is_active,
        status.is_ended,
        status.is_exhausted(),
        status.items_remaining
    );

    Ok(())
}

/// The wallet the page is rendered for: an explicit address, else the
/// keypair's wallet. An unreadable keypair gives the anonymous view.
pub fn view_wallet(
    wallet: Option<String>,
    keypair: Option<String>,
    settings: &MintSettings,
) -> Result<Option<Pubkey>> {
    if let Some(wallet) = wallet {
        return match Pubkey::from_str(&wallet) {
            Ok(wallet) => Ok(Some(wallet)),
            Err(_) => Err(anyhow!("Failed to parse wallet address: {}", wallet)),
        };
    }

    let keypair_path = resolve_keypair_path(keypair, settings, parse_solana_config().as_ref());
    match keypair_wallet(&keypair_path) {
        Ok(wallet) => Ok(Some(wallet)),
        Err(err) => {
            warn!("Showing the anonymous view: {}", err);
            println!(
                "{}{}",
                WARNING_EMOJI,
                style("No wallet keypair found, showing the page without a wallet").yellow()
            );
            Ok(None)
        }
    }
}

/// Wallet of the keypair file at `keypair_path`.
pub fn keypair_wallet(keypair_path: &str) -> Result<Pubkey, SetupError> {
    Ok(read_keypair(keypair_path)?.pubkey())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_wallet_is_used() {
        let wallet = Pubkey::new_unique();

        assert_eq!(
            view_wallet(Some(wallet.to_string()), None, &MintSettings::default()).unwrap(),
            Some(wallet)
        );
        assert!(view_wallet(Some("wallet".to_string()), None, &MintSettings::default()).is_err());
    }

    #[test]
    fn unreadable_keypair_is_anonymous() {
        let wallet = view_wallet(
            None,
            Some("/nonexistent/candy-mint/id.json".to_string()),
            &MintSettings::default(),
        )
        .unwrap();

        assert_eq!(wallet, None);
    }

    #[test]
    fn missing_keypair_has_no_wallet() {
        let err = keypair_wallet("/nonexistent/candy-mint/id.json").unwrap_err();
        assert!(matches!(err, SetupError::KeypairError(..)));
    }
}
