use anchor_client::solana_sdk::{native_token::lamports_to_sol, pubkey::Pubkey};
use console::style;

use crate::{
    constants::*,
    countdown::{format_timestamp, Countdown},
    engine::{DerivedStatus, MintPhase},
    fetch::Snapshot,
    sale::{Currency, EndCondition, SaleConfig, WhitelistMode},
    utils::print_with_style,
};

/// Text of the mint page for one instant, top to bottom.
pub fn page_lines(snapshot: &Snapshot, status: &DerivedStatus, now: i64) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(wallet) = &snapshot.participant.wallet {
        let balance = match snapshot.wallet_lamports {
            Some(lamports) => format!("{:.2} SOL", lamports_to_sol(lamports)),
            None => "unknown".to_string(),
        };
        lines.push(format!("Wallet {} | Balance: {}", shorten(wallet), balance));
    }

    lines.push(status.minted_line());

    match status.phase(now) {
        MintPhase::Countdown { go_live } => {
            lines.push(format!(
                "Mint starts in {}",
                Countdown::until(go_live, now).go_live_label()
            ));
            lines.push(format!("Go live: {}", format_timestamp(go_live)));
        }
        MintPhase::ConnectWallet => {
            lines.push("Connect a wallet (--keypair) to mint.".to_string());
        }
        MintPhase::Private => {
            lines.push("Mint is private.".to_string());
        }
        MintPhase::Button(button) => {
            let label = snapshot.sale.currency.label();

            match status.holder_banner() {
                // without a whitelist the banner is the price itself
                Some(price) if !status.gate.is_enabled() => {
                    lines.push(format!("Price: {} {}", price, label));
                }
                banner => {
                    lines.push(format!("Price: {} {}", status.effective_price, label));
                    lines.extend(banner);
                }
            }

            if status.is_active {
                if status.is_presale {
                    lines.push("PRESALE".to_string());
                }
                if let Some(end_date) = status.end_date {
                    let left = Countdown::until(end_date, now);
                    if !left.completed() {
                        lines.push(left.end_label());
                    }
                }
            }

            lines.push(format!("[ {} ]", button.label()));
        }
    }

    lines
}

/// Prints the page with the phase line highlighted.
pub fn print_page(snapshot: &Snapshot, status: &DerivedStatus, now: i64) {
    for line in styled_page(snapshot, status, now) {
        println!("{}", line);
    }
}

pub fn styled_page(snapshot: &Snapshot, status: &DerivedStatus, now: i64) -> Vec<String> {
    let lines = page_lines(snapshot, status, now);
    let last = lines.len().saturating_sub(1);

    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            if index == last {
                match status.phase(now) {
                    MintPhase::Button(_) if status.is_active => {
                        style(line).green().bold().to_string()
                    }
                    MintPhase::Countdown { .. } => format!("{}{}", HOURGLASS_EMOJI, line),
                    MintPhase::Private => format!("{}{}", LOCK_EMOJI, style(line).yellow()),
                    _ => style(line).red().to_string(),
                }
            } else {
                line
            }
        })
        .collect()
}

pub fn print_sale_details(candy_machine_id: &Pubkey, sale: &SaleConfig) {
    println!(
        "\n{}{} {}",
        CANDY_EMOJI,
        style("Candy machine ID:").dim(),
        candy_machine_id
    );
    println!(" {}", style(":").dim());

    print_with_style("", "items available", sale.items_available.to_string());
    print_with_style("", "items redeemed", sale.items_redeemed.to_string());
    print_with_style("", "items remaining", sale.items_remaining().to_string());
    print_with_style("", "price", format_amount(sale.price, &sale.currency));

    if let Currency::Token { mint, decimals } = sale.currency {
        print_with_style("", "token mint", format!("{} ({} decimals)", mint, decimals));
    }

    match sale.go_live {
        Some(go_live) => print_with_style("", "go live date", format_timestamp(go_live)),
        None => print_with_style("", "go live date", "none".to_string()),
    }

    match sale.end_condition {
        Some(EndCondition::ByDate(date)) => {
            print_with_style("", "end settings", "".to_string());
            print_with_style(":   ", "end setting type", "date".to_string());
            print_with_style(":   ", "number", format_timestamp(date));
        }
        Some(EndCondition::ByAmount(amount)) => {
            print_with_style("", "end settings", "".to_string());
            print_with_style(":   ", "end setting type", "amount".to_string());
            print_with_style(":   ", "number", amount.to_string());
        }
        None => print_with_style("", "end settings", "none".to_string()),
    }

    if let Some(whitelist) = &sale.whitelist {
        print_with_style("", "whitelist mint settings", "".to_string());
        print_with_style(
            ":   ",
            "mode",
            match whitelist.mode {
                WhitelistMode::BurnEveryTime => "burn every time".to_string(),
                WhitelistMode::NeverBurn => "never burn".to_string(),
            },
        );
        print_with_style(":   ", "mint", whitelist.mint.to_string());
        print_with_style(":   ", "presale", whitelist.presale.to_string());
        print_with_style(
            ":   ",
            "discount price",
            match whitelist.discount_price {
                Some(value) => format_amount(value, &sale.currency),
                None => "none".to_string(),
            },
        );
    } else {
        print_with_style("", "whitelist mint settings", "none".to_string());
    }

    match sale.gatekeeper {
        Some(network) => print_with_style("", "gatekeeper network", network.to_string()),
        None => print_with_style("", "gatekeeper", "none".to_string()),
    }
}

/// "1.5 SOL (1500000000)"
pub fn format_amount(amount: u64, currency: &Currency) -> String {
    format!(
        "{} {} ({})",
        currency.to_display(amount),
        currency.label(),
        amount
    )
}

fn shorten(wallet: &Pubkey) -> String {
    let address = wallet.to_string();
    if address.len() <= 8 {
        return address;
    }
    format!("{}..{}", &address[..4], &address[address.len() - 4..])
}
