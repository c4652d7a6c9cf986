//! Shared UI icons.
//!
//! Emoji constants with plain-text fallbacks for terminals that cannot render
//! them.

use console::Emoji;

// Stage status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[REJ]");
pub static HOURGLASS: Emoji<'_, '_> = Emoji("⏳ ", "[..]");
pub static IDLE: Emoji<'_, '_> = Emoji("⚪ ", "[ ]");

// Run indicators
pub static RUNNING: Emoji<'_, '_> = Emoji("▶️  ", "[>]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");
pub static STOP: Emoji<'_, '_> = Emoji("⏹️  ", "[STOP]");
pub static PARALLEL: Emoji<'_, '_> = Emoji("🔀 ", "[||]");
