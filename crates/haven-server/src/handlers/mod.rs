//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analyze;
pub mod audit;
pub mod chat;
pub mod entries;
pub mod health;
pub mod reports;

// Re-export all handlers for use in router
pub use analyze::*;
pub use audit::*;
pub use chat::*;
pub use entries::*;
pub use health::*;
pub use reports::*;
