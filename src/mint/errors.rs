use anchor_client::solana_sdk::{instruction::InstructionError, transaction::TransactionError};
use anchor_lang::error::ERROR_CODE_OFFSET;
use mpl_candy_machine::CandyError;
use solana_client::client_error::ClientError;
use thiserror::Error;

use crate::errors::FetchError;

// Error codes of the first candy machine program, still returned by older
// deployments.
pub const LEGACY_NOT_ENOUGH_SOL: u32 = 0x135;
pub const LEGACY_CANDY_MACHINE_EMPTY: u32 = 0x137;
pub const LEGACY_CANDY_MACHINE_NOT_LIVE: u32 = 0x138;

pub const NOT_ENOUGH_TOKENS: u32 = ERROR_CODE_OFFSET + CandyError::NotEnoughTokens as u32;
pub const NOT_ENOUGH_SOL: u32 = ERROR_CODE_OFFSET + CandyError::NotEnoughSOL as u32;
pub const CANDY_MACHINE_EMPTY: u32 = ERROR_CODE_OFFSET + CandyError::CandyMachineEmpty as u32;
pub const CANDY_MACHINE_NOT_LIVE: u32 = ERROR_CODE_OFFSET + CandyError::CandyMachineNotLive as u32;

/// Why a mint did not go through. The display text is the message shown to
/// the user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MintFailure {
    #[error("SOLD OUT!")]
    SoldOut,

    #[error("Minting period hasn't started yet.")]
    NotLive,

    #[error("Insufficient funds to mint. Please fund your wallet.")]
    InsufficientFunds,

    #[error("Transaction Timeout! Please try again.")]
    Timeout,

    #[error("This wallet is not on the mint list.")]
    NotListed,

    #[error("This sale requires a gateway token. Please mint from the web page.")]
    GatewayRequired,

    #[error("Minting failed! Please try again!")]
    Rejected { code: Option<u32> },
}

impl MintFailure {
    pub fn from_code(code: u32) -> Self {
        match code {
            LEGACY_NOT_ENOUGH_SOL | NOT_ENOUGH_SOL | NOT_ENOUGH_TOKENS => {
                MintFailure::InsufficientFunds
            }
            LEGACY_CANDY_MACHINE_EMPTY | CANDY_MACHINE_EMPTY => MintFailure::SoldOut,
            LEGACY_CANDY_MACHINE_NOT_LIVE | CANDY_MACHINE_NOT_LIVE => MintFailure::NotLive,
            code => MintFailure::Rejected { code: Some(code) },
        }
    }

    pub fn from_transaction_error(err: &TransactionError) -> Self {
        match err {
            TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
                MintFailure::from_code(*code)
            }
            TransactionError::InsufficientFundsForFee
            | TransactionError::InsufficientFundsForRent { .. } => MintFailure::InsufficientFunds,
            _ => MintFailure::Rejected { code: None },
        }
    }

    /// Program error code behind the failure, when there is one.
    pub fn code(&self) -> Option<u32> {
        match self {
            MintFailure::Rejected { code } => *code,
            _ => None,
        }
    }
}

impl From<ClientError> for MintFailure {
    fn from(err: ClientError) -> Self {
        match err.get_transaction_error() {
            Some(tx_err) => MintFailure::from_transaction_error(&tx_err),
            None => MintFailure::Rejected { code: None },
        }
    }
}

impl From<FetchError> for MintFailure {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Rpc(err) => MintFailure::from(err),
            _ => MintFailure::Rejected { code: None },
        }
    }
}
