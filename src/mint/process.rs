use std::time::Duration;

use anchor_client::solana_sdk::{native_token::lamports_to_sol, signature::Signer};
use anyhow::{anyhow, Result};
use console::style;
use tracing::{error, info, warn};

use crate::{
    config::load_mint_settings,
    constants::*,
    engine::{ButtonState, DerivedStatus, MintPhase},
    fetch::{fetch_snapshot, RpcFetcher},
    mint::{
        errors::MintFailure,
        submit::{MintOutcome, MintSubmit, RpcMinter},
    },
    refresh::{RefreshOutcome, RefreshTrigger, StatusTracker},
    setup::{candy_mint_setup, setup_rpc_client},
    utils::*,
};

pub struct MintArgs {
    pub keypair: Option<String>,
    pub rpc_url: Option<String>,
    pub config: String,
    pub candy_machine: Option<String>,
}

pub fn process_mint(args: MintArgs) -> Result<()> {
    let settings = load_mint_settings(&args.config)?;
    let candy_machine_id = resolve_candy_machine_id(args.candy_machine, &settings)?;
    let candy_mint_config = candy_mint_setup(args.keypair, args.rpc_url, &settings)?;
    let wallet = candy_mint_config.keypair.pubkey();

    println!(
        "{} {}Looking up candy machine",
        style("[1/3]").bold().dim(),
        LOOKING_GLASS_EMOJI
    );
    println!("Candy machine ID: {}", &candy_machine_id);
    println!("{}Wallet: {}", WALLET_EMOJI, wallet);

    let pb = spinner_with_style();
    pb.set_message("Connecting...");

    let fetcher = RpcFetcher::new(
        setup_rpc_client(&candy_mint_config.rpc_url),
        settings.spl_token_decimals,
    );
    let mut tracker = StatusTracker::new(Some(wallet));

    let ticket = tracker.begin(RefreshTrigger::Startup);
    let result = fetch_snapshot(&fetcher, &candy_machine_id, Some(&wallet));
    if let RefreshOutcome::Retained(err) = tracker.complete(ticket, result, unix_timestamp()) {
        pb.finish_with_message(format!("{}", style("Connection failed").red().bold()));
        return Err(err.into());
    }
    pb.finish_and_clear();

    let (sale, status) = match (tracker.snapshot(), tracker.status()) {
        (Some(snapshot), Some(status)) => (snapshot.sale.clone(), status.clone()),
        _ => return Err(anyhow!("No status available for {}", candy_machine_id)),
    };

    if !settings.allows(&wallet) {
        let error = MintFailure::NotListed;
        error!("{} is not on the allowlist", wallet);
        return Err(error.into());
    }

    ensure_mintable(&status, unix_timestamp())?;

    println!(
        "{} {}Minting from candy machine",
        style("[2/3]").bold().dim(),
        CANDY_EMOJI
    );
    info!("Minting NFT from candy machine: {}", &candy_machine_id);

    let pb = spinner_with_style();
    pb.set_message("Waiting for confirmation...");

    let minter = RpcMinter::new(
        fetcher.rpc(),
        &candy_mint_config.keypair,
        Duration::from_millis(settings.tx_timeout_ms),
    );

    match minter.submit(&candy_machine_id, &sale) {
        MintOutcome::Success { signature, mint } => {
            pb.finish_and_clear();
            tracker.record_mint();

            println!(
                "{}{}",
                CONFETTI_EMOJI,
                style("Congratulations! Mint succeeded!").green().bold()
            );
            println!("Signature: {}", signature);
            println!("NFT: {}", settings.cluster.explorer_link(&mint));

            if let Some(lamports) = tracker.snapshot().and_then(|s| s.wallet_lamports) {
                println!(
                    "Estimated balance: {:.2} SOL",
                    estimated_balance(lamports, &status, sale.token_mint_present())
                );
            }
        }
        MintOutcome::Failure(failure) => {
            pb.finish_with_message(format!("{}", style("Mint failed").red().bold()));
            return Err(failure.into());
        }
    }

    println!(
        "\n{} {}Refreshing",
        style("[3/3]").bold().dim(),
        COMPUTER_EMOJI
    );

    let ticket = tracker.begin(RefreshTrigger::MintSucceeded);
    let result = fetch_snapshot(&fetcher, &candy_machine_id, Some(&wallet));
    if let RefreshOutcome::Retained(err) = tracker.complete(ticket, result, unix_timestamp()) {
        // keeps the optimistic count
        warn!("Refresh after mint failed: {}", err);
    }

    if let Some(status) = tracker.status() {
        println!("{}", status.minted_line());
    }

    Ok(())
}

/// Refuses to send a transaction the page would not offer.
pub fn ensure_mintable(status: &DerivedStatus, now: i64) -> Result<()> {
    match status.phase(now) {
        MintPhase::Button(ButtonState::Mint) => Ok(()),
        MintPhase::Button(ButtonState::SoldOut) => Err(MintFailure::SoldOut.into()),
        MintPhase::Button(ButtonState::Ended) => Err(anyhow!("The sale has ended.")),
        MintPhase::Countdown { .. } | MintPhase::Button(ButtonState::Unavailable) => {
            Err(MintFailure::NotLive.into())
        }
        MintPhase::Private => Err(anyhow!("Mint is private.")),
        MintPhase::ConnectWallet => Err(anyhow!("A wallet is required to mint.")),
    }
}

/// Wallet balance after a mint, in SOL, before the next refresh reads it.
/// Token-priced sales only cost fees in SOL.
pub fn estimated_balance(lamports: u64, status: &DerivedStatus, token_priced: bool) -> f64 {
    let price = if token_priced {
        0.0
    } else {
        status.effective_price
    };

    lamports_to_sol(lamports) - price - SOL_FEES_ESTIMATION
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::evaluate,
        sale::{Currency, EndCondition, ParticipantContext, SaleConfig},
    };
    use anchor_client::solana_sdk::pubkey::Pubkey;

    const NOW: i64 = 1_660_000_000;

    fn sale() -> SaleConfig {
        SaleConfig {
            items_available: 10,
            items_redeemed: 0,
            price: 500_000_000,
            currency: Currency::Native,
            go_live: Some(NOW - 60),
            end_condition: None,
            whitelist: None,
            gatekeeper: None,
        }
    }

    fn holder() -> ParticipantContext {
        ParticipantContext::new(Pubkey::new_unique(), 0)
    }

    #[test]
    fn active_sale_is_mintable() {
        let status = evaluate(&sale(), &holder(), NOW);
        assert!(ensure_mintable(&status, NOW).is_ok());
    }

    #[test]
    fn refuses_what_the_page_does_not_offer() {
        let mut config = sale();
        config.go_live = Some(NOW + 60);
        let err = ensure_mintable(&evaluate(&config, &holder(), NOW), NOW).unwrap_err();
        assert_eq!(err.to_string(), "Minting period hasn't started yet.");

        let mut config = sale();
        config.items_redeemed = 10;
        let err = ensure_mintable(&evaluate(&config, &holder(), NOW), NOW).unwrap_err();
        assert_eq!(err.to_string(), "SOLD OUT!");

        let mut config = sale();
        config.end_condition = Some(EndCondition::ByDate(NOW - 1));
        assert!(ensure_mintable(&evaluate(&config, &holder(), NOW), NOW).is_err());

        let anonymous = evaluate(&sale(), &ParticipantContext::anonymous(), NOW);
        assert!(ensure_mintable(&anonymous, NOW).is_err());
    }

    #[test]
    fn balance_estimate_subtracts_price_and_fees() {
        let status = evaluate(&sale(), &holder(), NOW);

        let native = estimated_balance(2_000_000_000, &status, false);
        assert!((native - (2.0 - 0.5 - SOL_FEES_ESTIMATION)).abs() < 1e-9);

        let token = estimated_balance(2_000_000_000, &status, true);
        assert!((token - (2.0 - SOL_FEES_ESTIMATION)).abs() < 1e-9);
    }
}
