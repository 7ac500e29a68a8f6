//! Bookkeeping around "fetch, evaluate, publish". Every refresh is started
//! with a ticket; only the newest ticket may publish, so a slow fetch that
//! was overtaken by a newer trigger is dropped.

use anchor_client::solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

use crate::{
    engine::{evaluate, DerivedStatus},
    errors::FetchError,
    fetch::Snapshot,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshTrigger {
    Startup,
    WalletConnected,
    WalletDisconnected,
    PresaleChanged,
    Ended,
    MintSucceeded,
    Interval,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    trigger: RefreshTrigger,
}

impl Ticket {
    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger
    }
}

#[derive(Debug)]
pub enum RefreshOutcome {
    /// The fetch result was published. Carries the transitions that call
    /// for another fetch.
    Applied { transitions: Vec<RefreshTrigger> },
    /// The fetch failed; the previous status is kept.
    Retained(FetchError),
    /// A newer refresh was started while this one was in flight.
    Superseded,
}

#[derive(Debug, Default)]
pub struct StatusTracker {
    generation: u64,
    wallet: Option<Pubkey>,
    snapshot: Option<Snapshot>,
    status: Option<DerivedStatus>,
    /// Mints confirmed since the snapshot was taken.
    pending_mints: u64,
    ended: bool,
}

impl StatusTracker {
    pub fn new(wallet: Option<Pubkey>) -> Self {
        StatusTracker {
            wallet,
            ..StatusTracker::default()
        }
    }

    pub fn wallet(&self) -> Option<&Pubkey> {
        self.wallet.as_ref()
    }

    pub fn status(&self) -> Option<&DerivedStatus> {
        self.status.as_ref()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Starts a refresh. Any ticket handed out before becomes stale.
    pub fn begin(&mut self, trigger: RefreshTrigger) -> Ticket {
        self.generation += 1;
        debug!("Refresh #{} started by {:?}", self.generation, trigger);

        Ticket {
            generation: self.generation,
            trigger,
        }
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }

    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<Snapshot, FetchError>,
        now: i64,
    ) -> RefreshOutcome {
        if !self.is_current(&ticket) {
            debug!(
                "Dropping refresh #{} ({:?}), superseded by #{}",
                ticket.generation, ticket.trigger, self.generation
            );
            return RefreshOutcome::Superseded;
        }

        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.pending_mints = 0;
                RefreshOutcome::Applied {
                    transitions: self.reevaluate(now),
                }
            }
            Err(err) => {
                warn!(
                    "Refresh #{} ({:?}) failed, keeping last status: {}",
                    ticket.generation, ticket.trigger, err
                );
                RefreshOutcome::Retained(err)
            }
        }
    }

    /// Re-derives the status for a new instant from the cached snapshot.
    pub fn tick(&mut self, now: i64) -> Vec<RefreshTrigger> {
        if self.snapshot.is_none() {
            return Vec::new();
        }
        self.reevaluate(now)
    }

    /// Returns the trigger to fire when the connected wallet changed.
    pub fn wallet_changed(&mut self, wallet: Option<Pubkey>) -> Option<RefreshTrigger> {
        if self.wallet == wallet {
            return None;
        }

        let trigger = if wallet.is_some() {
            RefreshTrigger::WalletConnected
        } else {
            RefreshTrigger::WalletDisconnected
        };
        self.wallet = wallet;
        info!("Wallet changed: {:?}", trigger);

        Some(trigger)
    }

    /// Applies a confirmed mint to the published status until the next
    /// snapshot arrives.
    pub fn record_mint(&mut self) {
        self.pending_mints += 1;
        if let Some(status) = &mut self.status {
            status.record_mint();
        }
    }

    fn reevaluate(&mut self, now: i64) -> Vec<RefreshTrigger> {
        let snapshot = match &self.snapshot {
            Some(snapshot) => snapshot,
            None => return Vec::new(),
        };

        let mut status = evaluate(&snapshot.sale, &snapshot.participant, now);
        for _ in 0..self.pending_mints {
            status.record_mint();
        }
        if self.ended {
            status.latch_ended();
        }

        let mut transitions = Vec::new();
        if let Some(previous) = &self.status {
            if previous.is_presale != status.is_presale {
                transitions.push(RefreshTrigger::PresaleChanged);
            }
            if !previous.is_ended && status.is_ended {
                transitions.push(RefreshTrigger::Ended);
            }
        }

        self.ended |= status.is_ended;
        self.status = Some(status);

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fetch::tests::sale,
        sale::{EndCondition, ParticipantContext, WhitelistConfig, WhitelistMode},
    };
    use solana_client::client_error::{ClientError, ClientErrorKind};

    const NOW: i64 = 1_660_000_000;

    fn snapshot(items_redeemed: u64) -> Snapshot {
        let mut sale = sale();
        sale.items_redeemed = items_redeemed;
        Snapshot {
            sale,
            participant: ParticipantContext::new(Pubkey::new_unique(), 0),
            wallet_lamports: Some(1_000_000_000),
        }
    }

    fn rpc_error() -> FetchError {
        FetchError::Rpc(ClientError::from(ClientErrorKind::Custom(
            "connection refused".to_string(),
        )))
    }

    fn applied(outcome: RefreshOutcome) -> Vec<RefreshTrigger> {
        match outcome {
            RefreshOutcome::Applied { transitions } => transitions,
            other => panic!("expected Applied, got {:?}", other),
        }
    }

    #[test]
    fn newer_refresh_supersedes_older() {
        let mut tracker = StatusTracker::new(None);

        let first = tracker.begin(RefreshTrigger::Startup);
        let second = tracker.begin(RefreshTrigger::WalletConnected);
        assert_eq!(second.trigger(), RefreshTrigger::WalletConnected);

        assert!(applied(tracker.complete(second, Ok(snapshot(3)), NOW)).is_empty());
        assert!(matches!(
            tracker.complete(first, Ok(snapshot(9)), NOW),
            RefreshOutcome::Superseded
        ));

        assert_eq!(tracker.status().unwrap().items_redeemed, 3);
    }

    #[test]
    fn failed_refresh_keeps_last_status() {
        let mut tracker = StatusTracker::new(None);

        let ticket = tracker.begin(RefreshTrigger::Startup);
        applied(tracker.complete(ticket, Ok(snapshot(3)), NOW));
        let before = tracker.status().cloned();

        let ticket = tracker.begin(RefreshTrigger::Interval);
        match tracker.complete(ticket, Err(rpc_error()), NOW) {
            RefreshOutcome::Retained(err) => assert!(err.is_transient()),
            other => panic!("expected Retained, got {:?}", other),
        }

        assert_eq!(tracker.status().cloned(), before);
    }

    #[test]
    fn failed_first_refresh_publishes_nothing() {
        let mut tracker = StatusTracker::new(None);

        let ticket = tracker.begin(RefreshTrigger::Startup);
        tracker.complete(
            ticket,
            Err(FetchError::Deserialization(
                "cm".to_string(),
                "bad discriminator".to_string(),
            )),
            NOW,
        );

        assert!(tracker.status().is_none());
        assert!(tracker.tick(NOW).is_empty());
    }

    #[test]
    fn tick_reports_end_once_and_latches() {
        let mut tracker = StatusTracker::new(None);
        let mut ending = snapshot(0);
        ending.sale.end_condition = Some(EndCondition::ByDate(NOW + 10));

        let ticket = tracker.begin(RefreshTrigger::Startup);
        applied(tracker.complete(ticket, Ok(ending.clone()), NOW));
        assert!(tracker.status().unwrap().is_active);

        assert_eq!(tracker.tick(NOW + 10), vec![RefreshTrigger::Ended]);
        assert!(tracker.tick(NOW + 11).is_empty());

        // the authority pushed the end date back, the sale stays closed
        ending.sale.end_condition = Some(EndCondition::ByDate(NOW + 3600));
        let ticket = tracker.begin(RefreshTrigger::Ended);
        applied(tracker.complete(ticket, Ok(ending), NOW + 12));

        let status = tracker.status().unwrap();
        assert!(status.is_ended);
        assert!(!status.is_active);
    }

    #[test]
    fn presale_change_asks_for_refetch() {
        let mut tracker = StatusTracker::new(None);
        let mut presale = snapshot(0);
        presale.sale.whitelist = Some(WhitelistConfig {
            mint: Pubkey::new_unique(),
            discount_price: None,
            mode: WhitelistMode::NeverBurn,
            presale: true,
        });

        let ticket = tracker.begin(RefreshTrigger::Startup);
        applied(tracker.complete(ticket, Ok(presale.clone()), NOW));

        presale.sale.whitelist.as_mut().unwrap().presale = false;
        let ticket = tracker.begin(RefreshTrigger::Interval);
        let transitions = applied(tracker.complete(ticket, Ok(presale), NOW));

        assert_eq!(transitions, vec![RefreshTrigger::PresaleChanged]);
    }

    #[test]
    fn recorded_mint_survives_ticks_until_next_snapshot() {
        let mut tracker = StatusTracker::new(None);

        let ticket = tracker.begin(RefreshTrigger::Startup);
        applied(tracker.complete(ticket, Ok(snapshot(4)), NOW));

        tracker.record_mint();
        assert_eq!(tracker.status().unwrap().items_remaining, 5);

        tracker.tick(NOW + 1);
        assert_eq!(tracker.status().unwrap().items_remaining, 5);
        assert_eq!(tracker.status().unwrap().items_redeemed, 5);

        let ticket = tracker.begin(RefreshTrigger::MintSucceeded);
        applied(tracker.complete(ticket, Ok(snapshot(5)), NOW + 2));
        assert_eq!(tracker.status().unwrap().items_remaining, 5);
    }

    #[test]
    fn wallet_changes_produce_triggers() {
        let wallet = Pubkey::new_unique();
        let mut tracker = StatusTracker::new(None);

        assert_eq!(tracker.wallet_changed(None), None);
        assert_eq!(
            tracker.wallet_changed(Some(wallet)),
            Some(RefreshTrigger::WalletConnected)
        );
        assert_eq!(tracker.wallet(), Some(&wallet));
        assert_eq!(tracker.wallet_changed(Some(wallet)), None);
        assert_eq!(
            tracker.wallet_changed(None),
            Some(RefreshTrigger::WalletDisconnected)
        );
    }
}
