pub mod candy_machine;
pub mod cli;
pub mod config;
pub mod constants;
pub mod countdown;
pub mod engine;
pub mod errors;
pub mod fetch;
pub mod mint;
pub mod parse;
pub mod refresh;
pub mod sale;
pub mod setup;
pub mod status;
pub mod utils;
pub mod watch;
