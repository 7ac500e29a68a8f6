use std::{
    fmt::{self, Display},
    str::FromStr,
};

use anchor_client::solana_sdk::{pubkey::Pubkey, signature::Keypair};
pub use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::errors::*;

pub const DEFAULT_TX_TIMEOUT_MS: u64 = 30_000;

pub struct CandyMintConfig {
    pub keypair: Keypair,
    pub rpc_url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SolanaConfig {
    pub json_rpc_url: String,
    pub keypair_path: String,
    pub commitment: String,
}

/// Settings of one mint page, read from `mint.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MintSettings {
    #[serde(default)]
    #[serde(deserialize_with = "to_option_pubkey")]
    #[serde(serialize_with = "to_option_string")]
    pub candy_machine_id: Option<Pubkey>,

    #[serde(default)]
    pub cluster: Cluster,

    /// Decimals of the SPL token the sale is priced in. Read from the mint
    /// account when not set.
    #[serde(default)]
    pub spl_token_decimals: Option<u8>,

    #[serde(default = "default_tx_timeout")]
    pub tx_timeout_ms: u64,

    #[serde(default)]
    pub rpc_url: Option<String>,

    #[serde(default)]
    pub keypair: Option<String>,

    /// Wallets allowed to mint from this page; empty allows everyone.
    #[serde(default)]
    #[serde(deserialize_with = "to_pubkey_list")]
    #[serde(serialize_with = "to_string_list")]
    pub allowlist: Vec<Pubkey>,
}

impl Default for MintSettings {
    fn default() -> Self {
        MintSettings {
            candy_machine_id: None,
            cluster: Cluster::default(),
            spl_token_decimals: None,
            tx_timeout_ms: DEFAULT_TX_TIMEOUT_MS,
            rpc_url: None,
            keypair: None,
            allowlist: Vec::new(),
        }
    }
}

impl MintSettings {
    pub fn allows(&self, wallet: &Pubkey) -> bool {
        self.allowlist.is_empty() || self.allowlist.contains(wallet)
    }
}

fn default_tx_timeout() -> u64 {
    DEFAULT_TX_TIMEOUT_MS
}

pub fn to_option_string<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    match value {
        Some(v) => serializer.collect_str(&v),
        None => serializer.serialize_none(),
    }
}

fn to_string_list<S>(values: &[Pubkey], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(values.iter().map(|value| value.to_string()))
}

fn to_option_pubkey<'de, D>(deserializer: D) -> Result<Option<Pubkey>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Deserialize::deserialize(deserializer)?;

    match s {
        Some(s) => Pubkey::from_str(&s)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(ConfigError::InvalidAddress(s))),
        None => Ok(None),
    }
}

fn to_pubkey_list<'de, D>(deserializer: D) -> Result<Vec<Pubkey>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<String> = Deserialize::deserialize(deserializer)?;

    values
        .into_iter()
        .map(|s| {
            Pubkey::from_str(&s)
                .map_err(|_| serde::de::Error::custom(ConfigError::InvalidAddress(s)))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cluster {
    #[serde(rename = "devnet")]
    Devnet,
    #[serde(rename = "testnet")]
    Testnet,
    #[serde(rename = "mainnet-beta", alias = "mainnet")]
    Mainnet,
}

impl Default for Cluster {
    fn default() -> Cluster {
        Cluster::Devnet
    }
}

impl Cluster {
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::Mainnet => "https://api.mainnet-beta.solana.com",
        }
    }

    /// Solscan page of a freshly minted token.
    pub fn explorer_link(&self, mint: &Pubkey) -> String {
        match self {
            Cluster::Devnet | Cluster::Testnet => {
                format!("https://solscan.io/token/{}?cluster={}", mint, self)
            }
            Cluster::Mainnet => format!("https://solscan.io/token/{}", mint),
        }
    }
}

impl FromStr for Cluster {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Cluster::Mainnet),
            _ => Err(ConfigError::InvalidCluster(s.to_string()).into()),
        }
    }
}

impl Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cluster::Devnet => write!(f, "devnet"),
            Cluster::Testnet => write!(f, "testnet"),
            Cluster::Mainnet => write!(f, "mainnet-beta"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_settings() {
        let candy_machine = Pubkey::new_unique();
        let listed = Pubkey::new_unique();
        let json = format!(
            r#"{{
                "candyMachineId": "{}",
                "cluster": "mainnet-beta",
                "splTokenDecimals": 6,
                "txTimeoutMs": 60000,
                "rpcUrl": "https://rpc.example.com",
                "allowlist": ["{}"]
            }}"#,
            candy_machine, listed
        );

        let settings: MintSettings = serde_json::from_str(&json).unwrap();

        assert_eq!(settings.candy_machine_id, Some(candy_machine));
        assert_eq!(settings.cluster, Cluster::Mainnet);
        assert_eq!(settings.spl_token_decimals, Some(6));
        assert_eq!(settings.tx_timeout_ms, 60_000);
        assert_eq!(settings.rpc_url.as_deref(), Some("https://rpc.example.com"));
        assert!(settings.allows(&listed));
        assert!(!settings.allows(&Pubkey::new_unique()));
    }

    #[test]
    fn empty_settings_use_defaults() {
        let settings: MintSettings = serde_json::from_str("{}").unwrap();

        assert_eq!(settings, MintSettings::default());
        assert_eq!(settings.tx_timeout_ms, DEFAULT_TX_TIMEOUT_MS);
        assert!(settings.allows(&Pubkey::new_unique()));
    }

    #[test]
    fn rejects_bad_allowlist_entry() {
        let result: std::result::Result<MintSettings, _> =
            serde_json::from_str(r#"{ "allowlist": ["not-a-key"] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = MintSettings {
            candy_machine_id: Some(Pubkey::new_unique()),
            allowlist: vec![Pubkey::new_unique()],
            ..MintSettings::default()
        };

        let json = serde_json::to_string(&settings).unwrap();
        let parsed: MintSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn explorer_link_per_cluster() {
        let mint = Pubkey::new_unique();

        assert_eq!(
            Cluster::Devnet.explorer_link(&mint),
            format!("https://solscan.io/token/{}?cluster=devnet", mint)
        );
        assert_eq!(
            Cluster::Mainnet.explorer_link(&mint),
            format!("https://solscan.io/token/{}", mint)
        );
        assert_eq!("mainnet".parse::<Cluster>().unwrap(), Cluster::Mainnet);
        assert!("localnet".parse::<Cluster>().is_err());
    }
}
