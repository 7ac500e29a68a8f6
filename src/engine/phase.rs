use crate::{engine::DerivedStatus, sale::WhitelistMode};

/// What the mint page shows in place of the mint action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MintPhase {
    /// Counting down to go-live.
    Countdown { go_live: i64 },
    ConnectWallet,
    /// The sale is restricted to whitelist holders and the wallet has none.
    Private,
    Button(ButtonState),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonState {
    SoldOut,
    Ended,
    Mint,
    Unavailable,
}

impl ButtonState {
    pub fn label(&self) -> &'static str {
        match self {
            ButtonState::SoldOut => "SOLD OUT",
            ButtonState::Ended => "ENDED",
            ButtonState::Mint => "MINT",
            ButtonState::Unavailable => "UNAVAILABLE",
        }
    }
}

impl DerivedStatus {
    pub fn phase(&self, now: i64) -> MintPhase {
        let may_enter = !self.is_whitelist_only || self.whitelist_balance > 0;

        if let Some(go_live) = self.go_live {
            if !self.is_active && !self.is_ended && now < go_live && may_enter {
                return MintPhase::Countdown { go_live };
            }
        }

        if !self.wallet_present {
            return MintPhase::ConnectWallet;
        }

        if self.is_gated() && !self.is_ended && !self.is_exhausted() {
            return MintPhase::Private;
        }

        let button = if self.is_exhausted() {
            ButtonState::SoldOut
        } else if self.is_ended {
            ButtonState::Ended
        } else if self.is_active {
            ButtonState::Mint
        } else {
            ButtonState::Unavailable
        };

        MintPhase::Button(button)
    }

    /// Line shown above the mint button while the sale is active.
    pub fn holder_banner(&self) -> Option<String> {
        if !self.wallet_present || !self.is_active {
            return None;
        }

        match self.gate.mode() {
            Some(WhitelistMode::BurnEveryTime) if self.whitelist_balance > 0 => Some(format!(
                "You own {} WL mint {}.",
                self.whitelist_balance,
                if self.whitelist_balance > 1 {
                    "tokens"
                } else {
                    "token"
                }
            )),
            Some(WhitelistMode::NeverBurn) if self.whitelist_balance > 0 => {
                Some("Whitelisted".to_string())
            }
            Some(_) => None,
            None => Some(format!("{}", self.effective_price)),
        }
    }

    /// "TOTAL MINTED : redeemed / available"
    pub fn minted_line(&self) -> String {
        format!(
            "TOTAL MINTED : {} / {}",
            self.items_redeemed, self.items_available
        )
    }
}
