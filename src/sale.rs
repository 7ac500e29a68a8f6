use anchor_client::solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};
use mpl_candy_machine::{CandyMachine, EndSettingType, WhitelistMintMode};

/// Default decimals of the SPL token used to price a sale when the mint
/// account has not been looked up.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 9;

/// Read-only snapshot of the sale configuration held by a candy machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleConfig {
    pub items_available: u64,
    pub items_redeemed: u64,
    /// Price in lamports, or in base units of the payment token.
    pub price: u64,
    pub currency: Currency,
    /// Unix timestamp (seconds) of the public sale start.
    pub go_live: Option<i64>,
    pub end_condition: Option<EndCondition>,
    pub whitelist: Option<WhitelistConfig>,
    /// Gateway network required to mint, if any.
    pub gatekeeper: Option<Pubkey>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Currency {
    Native,
    Token { mint: Pubkey, decimals: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndCondition {
    /// Unix timestamp (seconds) after which the sale is closed.
    ByDate(i64),
    /// Maximum number of items that can be redeemed.
    ByAmount(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WhitelistMode {
    BurnEveryTime,
    NeverBurn,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhitelistConfig {
    pub mint: Pubkey,
    pub discount_price: Option<u64>,
    pub mode: WhitelistMode,
    pub presale: bool,
}

impl WhitelistConfig {
    pub fn burn_on_use(&self) -> bool {
        self.mode == WhitelistMode::BurnEveryTime
    }
}

impl Currency {
    /// Number of base units in one display unit.
    pub fn divisor(&self) -> f64 {
        match self {
            Currency::Native => LAMPORTS_PER_SOL as f64,
            Currency::Token { decimals, .. } => 10f64.powi(*decimals as i32),
        }
    }

    pub fn to_display(&self, amount: u64) -> f64 {
        amount as f64 / self.divisor()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Currency::Native => "SOL",
            Currency::Token { .. } => "SPL",
        }
    }
}

impl SaleConfig {
    /// Builds the snapshot from a deserialized candy machine account.
    ///
    /// `decimals` is only used when the sale is priced in an SPL token.
    pub fn from_candy_machine(candy_machine: &CandyMachine, decimals: u8) -> Self {
        let data = &candy_machine.data;

        let currency = match candy_machine.token_mint {
            Some(mint) => Currency::Token { mint, decimals },
            None => Currency::Native,
        };

        let end_condition = data
            .end_settings
            .as_ref()
            .map(|settings| match settings.end_setting_type {
                EndSettingType::Date => {
                    EndCondition::ByDate(i64::try_from(settings.number).unwrap_or(i64::MAX))
                }
                EndSettingType::Amount => EndCondition::ByAmount(settings.number),
            });

        let whitelist = data
            .whitelist_mint_settings
            .as_ref()
            .map(|settings| WhitelistConfig {
                mint: settings.mint,
                discount_price: settings.discount_price,
                mode: match settings.mode {
                    WhitelistMintMode::BurnEveryTime => WhitelistMode::BurnEveryTime,
                    WhitelistMintMode::NeverBurn => WhitelistMode::NeverBurn,
                },
                presale: settings.presale,
            });

        SaleConfig {
            items_available: data.items_available,
            items_redeemed: candy_machine.items_redeemed,
            price: data.price,
            currency,
            go_live: data.go_live_date,
            end_condition,
            whitelist,
            gatekeeper: data
                .gatekeeper
                .as_ref()
                .map(|gatekeeper| gatekeeper.gatekeeper_network),
        }
    }

    pub fn token_mint_present(&self) -> bool {
        matches!(self.currency, Currency::Token { .. })
    }

    pub fn items_remaining(&self) -> u64 {
        self.items_available.saturating_sub(self.items_redeemed)
    }
}

/// The wallet looking at the sale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParticipantContext {
    pub wallet: Option<Pubkey>,
    /// Whitelist tokens held by the wallet; 0 when the lookup failed.
    pub whitelist_balance: u64,
}

impl ParticipantContext {
    pub fn anonymous() -> Self {
        ParticipantContext::default()
    }

    pub fn new(wallet: Pubkey, whitelist_balance: u64) -> Self {
        ParticipantContext {
            wallet: Some(wallet),
            whitelist_balance,
        }
    }

    pub fn wallet_present(&self) -> bool {
        self.wallet.is_some()
    }
}
