use anchor_client::solana_sdk::pubkey::Pubkey;
use solana_client::rpc_client::RpcClient;
use spl_associated_token_account::get_associated_token_address;
use tracing::{debug, warn};

use crate::{
    candy_machine::{get_candy_machine_state, get_mint_decimals},
    errors::FetchError,
    sale::{ParticipantContext, SaleConfig, DEFAULT_TOKEN_DECIMALS},
};

/// Reads the sale configuration of a candy machine.
pub trait ChainStateFetch {
    fn fetch_sale(&self, sale_id: &Pubkey) -> Result<SaleConfig, FetchError>;
}

/// Whitelist token balance of a wallet. Never fails: any error reads as an
/// empty balance.
pub trait TokenBalanceFetch {
    fn whitelist_balance(&self, wallet: &Pubkey, token_mint: &Pubkey) -> u64;
}

pub trait WalletBalanceFetch {
    fn wallet_lamports(&self, wallet: &Pubkey) -> Result<u64, FetchError>;
}

/// Everything read from the chain in one refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub sale: SaleConfig,
    pub participant: ParticipantContext,
    /// Native balance of the wallet, when it could be read.
    pub wallet_lamports: Option<u64>,
}

pub struct RpcFetcher {
    rpc: RpcClient,
    token_decimals: Option<u8>,
}

impl RpcFetcher {
    /// `token_decimals` overrides the decimals read from the payment token
    /// mint account.
    pub fn new(rpc: RpcClient, token_decimals: Option<u8>) -> Self {
        RpcFetcher {
            rpc,
            token_decimals,
        }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

impl ChainStateFetch for RpcFetcher {
    fn fetch_sale(&self, sale_id: &Pubkey) -> Result<SaleConfig, FetchError> {
        let state = get_candy_machine_state(&self.rpc, sale_id)?;
        let decimals = sale_decimals(state.token_mint.as_ref(), self.token_decimals, |mint| {
            get_mint_decimals(&self.rpc, mint)
        })?;

        Ok(SaleConfig::from_candy_machine(&state, decimals))
    }
}

/// Decimals used to price a sale: configured decimals win over the ones
/// read from the payment token mint; native sales never look anything up.
fn sale_decimals<L>(
    token_mint: Option<&Pubkey>,
    configured: Option<u8>,
    lookup: L,
) -> Result<u8, FetchError>
where
    L: FnOnce(&Pubkey) -> Result<u8, FetchError>,
{
    match (token_mint, configured) {
        (Some(_), Some(decimals)) => Ok(decimals),
        (Some(mint), None) => lookup(mint),
        (None, _) => Ok(DEFAULT_TOKEN_DECIMALS),
    }
}

impl TokenBalanceFetch for RpcFetcher {
    /// Counts base units, so a fraction of a token still grants access.
    fn whitelist_balance(&self, wallet: &Pubkey, token_mint: &Pubkey) -> u64 {
        let token_account = get_associated_token_address(wallet, token_mint);

        let amount = match self.rpc.get_token_account_balance(&token_account) {
            Ok(amount) => amount,
            Err(err) => {
                warn!(
                    "Could not read whitelist token account {}: {}",
                    token_account, err
                );
                return 0;
            }
        };

        match amount.amount.parse::<u64>() {
            Ok(balance) => balance,
            Err(err) => {
                warn!(
                    "Malformed balance '{}' of token account {}: {}",
                    amount.amount, token_account, err
                );
                0
            }
        }
    }
}

impl WalletBalanceFetch for RpcFetcher {
    fn wallet_lamports(&self, wallet: &Pubkey) -> Result<u64, FetchError> {
        Ok(self.rpc.get_balance(wallet)?)
    }
}

/// Reads the sale and, when a wallet is connected, its whitelist and
/// native balances.
pub fn fetch_snapshot<F>(
    fetcher: &F,
    sale_id: &Pubkey,
    wallet: Option<&Pubkey>,
) -> Result<Snapshot, FetchError>
where
    F: ChainStateFetch + TokenBalanceFetch + WalletBalanceFetch + ?Sized,
{
    let sale = fetcher.fetch_sale(sale_id)?;

    let (participant, wallet_lamports) = match wallet {
        Some(wallet) => {
            let whitelist_balance = match &sale.whitelist {
                Some(whitelist) => fetcher.whitelist_balance(wallet, &whitelist.mint),
                None => 0,
            };

            let lamports = match fetcher.wallet_lamports(wallet) {
                Ok(lamports) => Some(lamports),
                Err(err) => {
                    warn!("Could not read balance of {}: {}", wallet, err);
                    None
                }
            };

            (ParticipantContext::new(*wallet, whitelist_balance), lamports)
        }
        None => (ParticipantContext::anonymous(), None),
    };

    debug!(
        "Fetched sale {}: {} redeemed of {}",
        sale_id, sale.items_redeemed, sale.items_available
    );

    Ok(Snapshot {
        sale,
        participant,
        wallet_lamports,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        engine::{evaluate, MintPhase},
        sale::{Currency, WhitelistConfig, WhitelistMode},
    };
    use serde_json::{json, Value};
    use solana_client::rpc_request::RpcRequest;
    use std::{cell::Cell, collections::HashMap};

    pub(crate) struct FakeChain {
        pub sale: Option<SaleConfig>,
        pub whitelist_balance: u64,
        pub lamports: Option<u64>,
        pub balance_lookups: Cell<u32>,
    }

    impl FakeChain {
        pub fn new(sale: SaleConfig) -> Self {
            FakeChain {
                sale: Some(sale),
                whitelist_balance: 0,
                lamports: Some(2_000_000_000),
                balance_lookups: Cell::new(0),
            }
        }
    }

    impl ChainStateFetch for FakeChain {
        fn fetch_sale(&self, sale_id: &Pubkey) -> Result<SaleConfig, FetchError> {
            self.sale
                .clone()
                .ok_or_else(|| FetchError::InvalidAddress(sale_id.to_string()))
        }
    }

    impl TokenBalanceFetch for FakeChain {
        fn whitelist_balance(&self, _wallet: &Pubkey, _token_mint: &Pubkey) -> u64 {
            self.balance_lookups.set(self.balance_lookups.get() + 1);
            self.whitelist_balance
        }
    }

    impl WalletBalanceFetch for FakeChain {
        fn wallet_lamports(&self, wallet: &Pubkey) -> Result<u64, FetchError> {
            self.lamports
                .ok_or_else(|| FetchError::InvalidAddress(wallet.to_string()))
        }
    }

    pub(crate) fn sale() -> SaleConfig {
        SaleConfig {
            items_available: 10,
            items_redeemed: 0,
            price: 1_000_000_000,
            currency: Currency::Native,
            go_live: Some(0),
            end_condition: None,
            whitelist: None,
            gatekeeper: None,
        }
    }

    #[test]
    fn anonymous_snapshot_skips_wallet_lookups() {
        let chain = FakeChain::new(sale());

        let snapshot = fetch_snapshot(&chain, &Pubkey::new_unique(), None).unwrap();

        assert_eq!(snapshot.participant, ParticipantContext::anonymous());
        assert_eq!(snapshot.wallet_lamports, None);
        assert_eq!(chain.balance_lookups.get(), 0);
    }

    #[test]
    fn whitelist_balance_read_only_with_whitelist() {
        let wallet = Pubkey::new_unique();
        let mut chain = FakeChain::new(sale());
        chain.whitelist_balance = 3;

        let snapshot = fetch_snapshot(&chain, &Pubkey::new_unique(), Some(&wallet)).unwrap();
        assert_eq!(snapshot.participant.whitelist_balance, 0);
        assert_eq!(chain.balance_lookups.get(), 0);

        let mut with_whitelist = sale();
        with_whitelist.whitelist = Some(WhitelistConfig {
            mint: Pubkey::new_unique(),
            discount_price: None,
            mode: WhitelistMode::NeverBurn,
            presale: false,
        });
        chain.sale = Some(with_whitelist);

        let snapshot = fetch_snapshot(&chain, &Pubkey::new_unique(), Some(&wallet)).unwrap();
        assert_eq!(snapshot.participant, ParticipantContext::new(wallet, 3));
        assert_eq!(snapshot.wallet_lamports, Some(2_000_000_000));
    }

    #[test]
    fn wallet_balance_failure_is_not_fatal() {
        let mut chain = FakeChain::new(sale());
        chain.lamports = None;

        let snapshot =
            fetch_snapshot(&chain, &Pubkey::new_unique(), Some(&Pubkey::new_unique())).unwrap();
        assert_eq!(snapshot.wallet_lamports, None);
    }

    fn mock_fetcher(request: RpcRequest, value: Value) -> RpcFetcher {
        let mut mocks = HashMap::new();
        mocks.insert(request, value);
        RpcFetcher::new(
            RpcClient::new_mock_with_mocks("succeeds".to_string(), mocks),
            None,
        )
    }

    fn token_balance(amount: &str, decimals: u8, ui_amount: f64) -> Value {
        json!({
            "context": { "slot": 1 },
            "value": {
                "amount": amount,
                "decimals": decimals,
                "uiAmount": ui_amount,
                "uiAmountString": ui_amount.to_string(),
            }
        })
    }

    #[test]
    fn whitelist_balance_reads_token_account() {
        let fetcher = mock_fetcher(
            RpcRequest::GetTokenAccountBalance,
            token_balance("3", 0, 3.0),
        );

        assert_eq!(
            fetcher.whitelist_balance(&Pubkey::new_unique(), &Pubkey::new_unique()),
            3
        );
    }

    #[test]
    fn fraction_of_a_whitelist_token_counts() {
        let fetcher = mock_fetcher(
            RpcRequest::GetTokenAccountBalance,
            token_balance("500000", 6, 0.5),
        );

        let balance = fetcher.whitelist_balance(&Pubkey::new_unique(), &Pubkey::new_unique());
        assert_eq!(balance, 500_000);

        // a holder of half a token is not locked out of a presale
        let mut presale = sale();
        presale.go_live = Some(i64::MAX);
        presale.whitelist = Some(WhitelistConfig {
            mint: Pubkey::new_unique(),
            discount_price: None,
            mode: WhitelistMode::NeverBurn,
            presale: true,
        });
        let status = evaluate(
            &presale,
            &ParticipantContext::new(Pubkey::new_unique(), balance),
            0,
        );
        assert!(status.is_active);
        assert_ne!(status.phase(0), MintPhase::Private);
    }

    #[test]
    fn failed_whitelist_lookup_reads_as_empty() {
        let fetcher = RpcFetcher::new(RpcClient::new_mock("fails".to_string()), None);

        assert_eq!(
            fetcher.whitelist_balance(&Pubkey::new_unique(), &Pubkey::new_unique()),
            0
        );
    }

    #[test]
    fn malformed_whitelist_amount_reads_as_empty() {
        let fetcher = mock_fetcher(
            RpcRequest::GetTokenAccountBalance,
            token_balance("lots", 0, 1.0),
        );

        assert_eq!(
            fetcher.whitelist_balance(&Pubkey::new_unique(), &Pubkey::new_unique()),
            0
        );
    }

    #[test]
    fn wallet_lamports_from_rpc() {
        let fetcher = mock_fetcher(
            RpcRequest::GetBalance,
            json!({ "context": { "slot": 1 }, "value": 1_250_000_000u64 }),
        );
        assert_eq!(
            fetcher.wallet_lamports(&Pubkey::new_unique()).unwrap(),
            1_250_000_000
        );

        let failing = RpcFetcher::new(RpcClient::new_mock("fails".to_string()), None);
        let err = failing.wallet_lamports(&Pubkey::new_unique()).unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn configured_decimals_win_over_mint_lookup() {
        let mint = Pubkey::new_unique();

        let decimals = sale_decimals(Some(&mint), Some(6), |_| -> Result<u8, FetchError> {
            panic!("mint account must not be read")
        })
        .unwrap();
        assert_eq!(decimals, 6);

        let decimals = sale_decimals(Some(&mint), None, |looked_up| {
            assert_eq!(looked_up, &mint);
            Ok(2)
        })
        .unwrap();
        assert_eq!(decimals, 2);
    }

    #[test]
    fn native_sale_skips_mint_lookup() {
        let decimals = sale_decimals(None, Some(6), |_| -> Result<u8, FetchError> {
            panic!("native sales have no mint")
        })
        .unwrap();
        assert_eq!(decimals, DEFAULT_TOKEN_DECIMALS);

        let failed = sale_decimals(Some(&Pubkey::new_unique()), None, |mint| {
            Err(FetchError::InvalidAddress(mint.to_string()))
        });
        assert!(matches!(failed, Err(FetchError::InvalidAddress(_))));
    }

    #[test]
    fn sale_failure_propagates() {
        let mut chain = FakeChain::new(sale());
        chain.sale = None;

        let result = fetch_snapshot(&chain, &Pubkey::new_unique(), None);
        assert!(matches!(result, Err(FetchError::InvalidAddress(_))));
    }
}
