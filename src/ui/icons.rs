//! Status icons for terminal output, with plain-text fallbacks.

use console::Emoji;

pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static REVIEW: Emoji<'_, '_> = Emoji("🔍 ", "[R]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");
