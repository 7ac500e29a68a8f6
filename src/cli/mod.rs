use clap::{AppSettings, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about)]
#[clap(setting(AppSettings::SubcommandRequiredElseHelp))]
pub struct Cli {
    /// Log level: trace, debug, info, warn, error, off
    #[clap(short, long, global = true)]
    pub log_level: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the sale and what the mint page offers right now
    Status {
        /// Path to the keypair file, uses Sol config or defaults to "~/.config/solana/id.json"
        #[clap(short, long)]
        keypair: Option<String>,

        /// RPC Url
        #[clap(short, long)]
        rpc_url: Option<String>,

        /// Path to the mint settings file, defaults to "mint.json"
        #[clap(short, long, default_value = "mint.json")]
        config: String,

        /// Address of candy machine to look up
        #[clap(long)]
        candy_machine: Option<String>,

        /// Show the page as seen by this wallet instead of the keypair's
        #[clap(short, long)]
        wallet: Option<String>,
    },

    /// Keep the mint page on screen with live countdowns and refreshes
    Watch {
        /// Path to the keypair file, uses Sol config or defaults to "~/.config/solana/id.json"
        #[clap(short, long)]
        keypair: Option<String>,

        /// RPC Url
        #[clap(short, long)]
        rpc_url: Option<String>,

        /// Path to the mint settings file, defaults to "mint.json"
        #[clap(short, long, default_value = "mint.json")]
        config: String,

        /// Address of candy machine to watch
        #[clap(long)]
        candy_machine: Option<String>,

        /// Show the page as seen by this wallet instead of the keypair's
        #[clap(short, long)]
        wallet: Option<String>,
    },

    /// Mint one NFT from the candy machine
    Mint {
        /// Path to the keypair file, uses Sol config or defaults to "~/.config/solana/id.json"
        #[clap(short, long)]
        keypair: Option<String>,

        /// RPC Url
        #[clap(short, long)]
        rpc_url: Option<String>,

        /// Path to the mint settings file, defaults to "mint.json"
        #[clap(short, long, default_value = "mint.json")]
        config: String,

        /// Address of candy machine to mint from
        #[clap(long)]
        candy_machine: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mint_with_defaults() {
        let cli = Cli::parse_from(["candy-mint", "mint", "--candy-machine", "cm"]);

        assert!(cli.log_level.is_none());
        match cli.command {
            Commands::Mint {
                config,
                candy_machine,
                keypair,
                ..
            } => {
                assert_eq!(config, "mint.json");
                assert_eq!(candy_machine.as_deref(), Some("cm"));
                assert!(keypair.is_none());
            }
            _ => panic!("expected the mint command"),
        }
    }

    #[test]
    fn log_level_is_global() {
        let cli = Cli::parse_from(["candy-mint", "watch", "-l", "debug", "-w", "wallet"]);

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(
            cli.command,
            Commands::Watch { wallet: Some(_), .. }
        ));
    }
}
