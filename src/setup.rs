use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::{read_keypair_file, Keypair},
};
use anyhow::Result;
use solana_client::rpc_client::RpcClient;
use tracing::debug;

use crate::config::data::{CandyMintConfig, MintSettings, SolanaConfig};
use crate::errors::SetupError;
use crate::parse::*;

pub const DEFAULT_KEYPAIR_PATH: &str = "~/.config/solana/id.json";

pub fn setup_rpc_client(rpc_url: &str) -> RpcClient {
    RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed())
}

/// Resolves the RPC url and keypair: command line first, then the mint
/// settings file, then the Solana CLI config, then defaults.
pub fn candy_mint_setup(
    keypair_opt: Option<String>,
    rpc_url_opt: Option<String>,
    settings: &MintSettings,
) -> Result<CandyMintConfig> {
    let sol_config = parse_solana_config();

    let rpc_url = resolve_rpc_url(rpc_url_opt, settings, sol_config.as_ref());
    let keypair_path = resolve_keypair_path(keypair_opt, settings, sol_config.as_ref());
    let keypair = read_keypair(&keypair_path)?;

    debug!("Using RPC {} and keypair {}", rpc_url, keypair_path);

    Ok(CandyMintConfig { keypair, rpc_url })
}

pub fn resolve_rpc_url(
    rpc_url_opt: Option<String>,
    settings: &MintSettings,
    sol_config: Option<&SolanaConfig>,
) -> String {
    match rpc_url_opt.or_else(|| settings.rpc_url.clone()) {
        Some(rpc_url) => rpc_url,
        None => match sol_config {
            Some(sol_config) => sol_config.json_rpc_url.clone(),
            None => settings.cluster.default_rpc_url().to_string(),
        },
    }
}

pub fn resolve_keypair_path(
    keypair_opt: Option<String>,
    settings: &MintSettings,
    sol_config: Option<&SolanaConfig>,
) -> String {
    match keypair_opt.or_else(|| settings.keypair.clone()) {
        Some(keypair_path) => keypair_path,
        None => match sol_config {
            Some(sol_config) => sol_config.keypair_path.clone(),
            None => DEFAULT_KEYPAIR_PATH.to_string(),
        },
    }
}

pub fn read_keypair(path: &str) -> Result<Keypair, SetupError> {
    let expanded = shellexpand::tilde(path);
    read_keypair_file(&*expanded)
        .map_err(|err| SetupError::KeypairError(path.to_string(), err.to_string()))
}
