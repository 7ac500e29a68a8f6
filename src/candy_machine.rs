use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_lang::AccountDeserialize;
use mpl_candy_machine::CandyMachine;
use solana_client::rpc_client::RpcClient;
use solana_program::program_pack::Pack;
use spl_token::state::Mint;

use crate::errors::FetchError;

pub use mpl_candy_machine::ID as CANDY_MACHINE_ID;

pub fn get_candy_machine_state(
    rpc: &RpcClient,
    candy_machine_id: &Pubkey,
) -> Result<CandyMachine, FetchError> {
    let data = rpc.get_account_data(candy_machine_id)?;
    CandyMachine::try_deserialize(&mut data.as_slice())
        .map_err(|err| FetchError::Deserialization(candy_machine_id.to_string(), err.to_string()))
}

/// Decimals of the SPL token a sale is priced in.
pub fn get_mint_decimals(rpc: &RpcClient, mint: &Pubkey) -> Result<u8, FetchError> {
    let data = rpc.get_account_data(mint)?;
    let token_mint = Mint::unpack(&data)
        .map_err(|err| FetchError::Deserialization(mint.to_string(), err.to_string()))?;
    Ok(token_mint.decimals)
}
