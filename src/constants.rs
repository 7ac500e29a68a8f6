use console::Emoji;

/// Size of an SPL token mint account.
pub const MINT_LAYOUT: u64 = 82;

/// Rough network fees of a mint transaction, in SOL.
pub const SOL_FEES_ESTIMATION: f64 = 0.012;

/// Interval between two confirmation polls of a mint transaction.
pub const CONFIRMATION_POLL_MS: u64 = 500;

/// Interval between two redraws of the watch screen.
pub const WATCH_TICK_MS: u64 = 1000;

/// Interval between two full refreshes of the on-chain state while watching.
pub const WATCH_REFRESH_SECS: u64 = 30;

pub const CANDY_EMOJI: Emoji<'_, '_> = Emoji("🍬 ", "");
pub const LOOKING_GLASS_EMOJI: Emoji<'_, '_> = Emoji("🔍 ", "");
pub const COMPUTER_EMOJI: Emoji<'_, '_> = Emoji("🖥  ", "");
pub const HOURGLASS_EMOJI: Emoji<'_, '_> = Emoji("⏳ ", "");
pub const WALLET_EMOJI: Emoji<'_, '_> = Emoji("👛 ", "");
pub const LOCK_EMOJI: Emoji<'_, '_> = Emoji("🔒 ", "");
pub const CONFETTI_EMOJI: Emoji<'_, '_> = Emoji("🎉 ", "");
pub const COMPLETE_EMOJI: Emoji<'_, '_> = Emoji("✅ ", "");
pub const ERROR_EMOJI: Emoji<'_, '_> = Emoji("🛑 ", "");
pub const WARNING_EMOJI: Emoji<'_, '_> = Emoji("⚠️  ", "");
