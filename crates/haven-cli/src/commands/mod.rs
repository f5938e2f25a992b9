//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, require_ai)
//! - `companion` - AI commands (analyze, chat)
//! - `entries` - Journal entry commands (list, show, delete)
//! - `reports` - Therapy report (PDF or JSON)
//! - `serve` - Web server command
//! - `status` - Database and backend status

pub mod companion;
pub mod core;
pub mod entries;
pub mod reports;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use companion::*;
pub use self::core::*;
pub use entries::*;
pub use reports::*;
pub use serve::*;
pub use status::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
