//! Mint eligibility: derives what the mint page shows from the sale
//! configuration, the participant and the current time.

pub mod phase;

pub use phase::*;

use crate::sale::{EndCondition, ParticipantContext, SaleConfig, WhitelistMode};

/// How the whitelist token shapes access to the sale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WhitelistGate {
    /// No whitelist configured, everyone mints at the nominal price.
    None,
    /// Token holders may mint before go-live.
    Presale { mode: WhitelistMode },
    /// Only token holders may mint, at the nominal price.
    Exclusive { mode: WhitelistMode },
    /// Everyone mints after go-live, token holders pay the discount price.
    Discount { mode: WhitelistMode },
}

impl WhitelistGate {
    pub fn mode(&self) -> Option<WhitelistMode> {
        match self {
            WhitelistGate::None => None,
            WhitelistGate::Presale { mode }
            | WhitelistGate::Exclusive { mode }
            | WhitelistGate::Discount { mode } => Some(*mode),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, WhitelistGate::None)
    }
}

/// Status of the sale as seen by one participant at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedStatus {
    pub is_active: bool,
    pub is_ended: bool,
    pub is_sold_out: bool,
    pub is_presale: bool,
    pub is_whitelist_only: bool,
    pub gate: WhitelistGate,
    pub price: f64,
    pub whitelist_price: f64,
    pub effective_price: f64,
    /// Items available, clamped by an amount end condition.
    pub items_available: u64,
    pub items_redeemed: u64,
    pub items_remaining: u64,
    pub go_live: Option<i64>,
    pub end_date: Option<i64>,
    pub whitelist_balance: u64,
    pub wallet_present: bool,
}

/// Derives the status of a sale. Pure: the same inputs always give the same
/// output and nothing is fetched.
pub fn evaluate(config: &SaleConfig, participant: &ParticipantContext, now: i64) -> DerivedStatus {
    let balance = participant.whitelist_balance;

    let price = config.currency.to_display(config.price);
    let mut whitelist_price = price;

    let mut is_active = false;
    let mut is_ended = false;
    let mut is_sold_out = false;
    let mut is_presale = false;
    let mut is_whitelist_only = false;
    let mut gate = WhitelistGate::None;

    if let Some(whitelist) = &config.whitelist {
        is_presale = whitelist.presale;
        is_whitelist_only = !is_presale && whitelist.discount_price.is_none();

        if let Some(discount) = whitelist.discount_price {
            if discount != config.price {
                whitelist_price = config.currency.to_display(discount);
            }
        }

        gate = if is_presale {
            WhitelistGate::Presale {
                mode: whitelist.mode,
            }
        } else if is_whitelist_only {
            WhitelistGate::Exclusive {
                mode: whitelist.mode,
            }
        } else {
            WhitelistGate::Discount {
                mode: whitelist.mode,
            }
        };

        is_active = is_presale && !is_ended && balance > 0;
    }

    let mut end_date = None;
    let mut items_available = config.items_available;
    let mut items_remaining = config.items_remaining();

    match config.end_condition {
        Some(EndCondition::ByDate(date)) => {
            end_date = Some(date);
            if now >= date {
                is_ended = true;
                is_active = false;
            }
        }
        Some(EndCondition::ByAmount(limit)) => {
            items_available = limit.min(config.items_available);
            if config.items_redeemed >= items_available {
                items_remaining = 0;
                is_sold_out = true;
                is_ended = true;
            } else {
                items_remaining = items_available - config.items_redeemed;
            }
        }
        None => (),
    }

    if is_sold_out {
        is_active = false;
    }

    let gated = gate_applies(gate, balance);

    if !gated && !is_ended && !is_sold_out {
        if let Some(go_live) = config.go_live {
            if now >= go_live {
                is_active = true;
            }
        }
    }

    let effective_price = if gate.is_enabled() && balance > 0 {
        whitelist_price
    } else {
        price
    };

    DerivedStatus {
        is_active,
        is_ended,
        is_sold_out,
        is_presale,
        is_whitelist_only,
        gate,
        price,
        whitelist_price,
        effective_price,
        items_available,
        items_redeemed: config.items_redeemed,
        items_remaining,
        go_live: config.go_live,
        end_date,
        whitelist_balance: balance,
        wallet_present: participant.wallet_present(),
    }
}

/// A holder-only window (presale or exclusive) locks out wallets without
/// whitelist tokens.
fn gate_applies(gate: WhitelistGate, balance: u64) -> bool {
    matches!(
        gate,
        WhitelistGate::Presale { .. } | WhitelistGate::Exclusive { .. }
    ) && balance == 0
}

impl DerivedStatus {
    /// Sold out, either flagged by an amount end condition or because no
    /// items are left.
    pub fn is_exhausted(&self) -> bool {
        self.is_sold_out || self.items_remaining == 0
    }

    /// Whether the whitelist window keeps this participant out.
    pub fn is_gated(&self) -> bool {
        gate_applies(self.gate, self.whitelist_balance)
    }

    /// Optimistic update applied after a confirmed mint, before the next
    /// refresh of the on-chain state.
    pub fn record_mint(&mut self) {
        self.items_remaining = self.items_remaining.saturating_sub(1);
        self.items_redeemed = self.items_redeemed.saturating_add(1);
        self.is_sold_out = self.items_remaining == 0;

        if self.gate.mode() == Some(WhitelistMode::BurnEveryTime) && self.whitelist_balance > 0 {
            self.whitelist_balance -= 1;
            if self.whitelist_balance == 0 {
                self.effective_price = self.price;
            }
        }

        // only a holder-only window closes when the last token burns
        if self.is_gated() || self.is_sold_out {
            self.is_active = false;
        }
    }

    /// Forces the ended state; an ended sale never becomes active again.
    pub fn latch_ended(&mut self) {
        self.is_ended = true;
        self.is_active = false;
    }
}
