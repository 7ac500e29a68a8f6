use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anchor_client::solana_sdk::pubkey::Pubkey;
use anyhow::Result;
use console::{style, Term};
use tokio::{sync::mpsc, task, time};
use tracing::{debug, info};

use crate::{
    config::load_mint_settings,
    constants::*,
    errors::FetchError,
    fetch::{fetch_snapshot, RpcFetcher, Snapshot},
    parse::parse_solana_config,
    refresh::{RefreshOutcome, RefreshTrigger, StatusTracker, Ticket},
    setup::{resolve_keypair_path, resolve_rpc_url, setup_rpc_client},
    status::{keypair_wallet, styled_page, view_wallet},
    utils::*,
};

pub struct WatchArgs {
    pub keypair: Option<String>,
    pub rpc_url: Option<String>,
    pub config: String,
    pub candy_machine: Option<String>,
    pub wallet: Option<String>,
    pub interrupted: Arc<AtomicBool>,
}

type FetchResult = (Ticket, Result<Snapshot, FetchError>);

pub async fn process_watch(args: WatchArgs) -> Result<()> {
    let settings = load_mint_settings(&args.config)?;
    let candy_machine_id = resolve_candy_machine_id(args.candy_machine, &settings)?;
    let sol_config = parse_solana_config();
    // without --wallet the page follows whatever keypair sits at the path
    let keypair_path = args.wallet.is_none().then(|| {
        resolve_keypair_path(args.keypair.clone(), &settings, sol_config.as_ref())
    });
    let wallet = view_wallet(args.wallet, args.keypair, &settings)?;
    let rpc_url = resolve_rpc_url(args.rpc_url, &settings, sol_config.as_ref());

    println!(
        "{} {}Watching candy machine {}",
        style("[1/1]").bold().dim(),
        CANDY_EMOJI,
        candy_machine_id
    );
    println!("{}", style("Press Ctrl+C to stop.").dim());

    let fetcher = Arc::new(RpcFetcher::new(
        setup_rpc_client(&rpc_url),
        settings.spl_token_decimals,
    ));
    let mut tracker = StatusTracker::new(wallet);
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchResult>();

    // ctrl-c flips the flag back to true
    args.interrupted.store(false, Ordering::SeqCst);

    spawn_refresh(
        &fetcher,
        &mut tracker,
        RefreshTrigger::Startup,
        candy_machine_id,
        &tx,
    );

    let mut ticker = time::interval(Duration::from_millis(WATCH_TICK_MS));
    let mut refresher = time::interval(Duration::from_secs(WATCH_REFRESH_SECS));
    // the first tick of an interval completes immediately
    refresher.tick().await;

    let term = Term::stdout();
    let mut drawn = 0;
    let mut notice: Option<String> = None;

    while !args.interrupted.load(Ordering::SeqCst) {
        let now = tokio::select! {
            Some((ticket, result)) = rx.recv() => {
                let now = unix_timestamp();
                match tracker.complete(ticket, result, now) {
                    RefreshOutcome::Applied { transitions } => {
                        notice = None;
                        for trigger in transitions {
                            spawn_refresh(&fetcher, &mut tracker, trigger, candy_machine_id, &tx);
                        }
                    }
                    RefreshOutcome::Retained(err) => {
                        notice = Some(if err.is_transient() {
                            format!("Connection problem, retrying: {}", err)
                        } else {
                            format!("Could not read the candy machine: {}", err)
                        });
                    }
                    RefreshOutcome::Superseded => (),
                }
                now
            }
            _ = ticker.tick() => {
                let now = unix_timestamp();
                for trigger in tracker.tick(now) {
                    spawn_refresh(&fetcher, &mut tracker, trigger, candy_machine_id, &tx);
                }
                now
            }
            _ = refresher.tick() => {
                let trigger = match &keypair_path {
                    Some(path) => interval_trigger(&mut tracker, keypair_wallet(path).ok()),
                    None => RefreshTrigger::Interval,
                };
                spawn_refresh(&fetcher, &mut tracker, trigger, candy_machine_id, &tx);
                unix_timestamp()
            }
        };

        let mut lines = match (tracker.snapshot(), tracker.status()) {
            (Some(snapshot), Some(status)) => styled_page(snapshot, status, now),
            _ => vec![style("Loading...").dim().to_string()],
        };
        if let Some(notice) = &notice {
            lines.push(format!("{}{}", WARNING_EMOJI, style(notice).yellow()));
        }

        term.clear_last_lines(drawn)?;
        for line in &lines {
            term.write_line(line)?;
        }
        drawn = lines.len();
    }

    info!("Stopped watching {}", candy_machine_id);

    Ok(())
}

/// A periodic refresh doubles as the wallet check: a different keypair
/// wallet refreshes as a wallet change.
fn interval_trigger(tracker: &mut StatusTracker, wallet: Option<Pubkey>) -> RefreshTrigger {
    tracker
        .wallet_changed(wallet)
        .unwrap_or(RefreshTrigger::Interval)
}

/// Starts a fetch on the blocking pool. Its result comes back tagged with
/// the ticket, so the tracker can drop it if a newer refresh started since.
fn spawn_refresh(
    fetcher: &Arc<RpcFetcher>,
    tracker: &mut StatusTracker,
    trigger: RefreshTrigger,
    candy_machine_id: Pubkey,
    tx: &mpsc::UnboundedSender<FetchResult>,
) {
    let ticket = tracker.begin(trigger);
    let wallet = tracker.wallet().copied();
    let fetcher = fetcher.clone();
    let tx = tx.clone();

    task::spawn_blocking(move || {
        let result = fetch_snapshot(fetcher.as_ref(), &candy_machine_id, wallet.as_ref());
        if tx.send((ticket, result)).is_err() {
            debug!("Watch stopped before refresh {:?} completed", ticket);
        }
    });
}
