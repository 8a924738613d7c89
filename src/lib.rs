//! chatlet — minimal self-hosted web chat client.
//!
//! This library crate re-exports modules so integration tests
//! (under `tests/`) can access them.

pub mod config;
pub mod context;
pub mod format;
pub mod gateway;
pub mod models;
pub mod store;
pub mod usage;

/// Return the chatlet home directory.
///
/// Resolution order:
/// 1. `CHATLET_HOME` environment variable
/// 2. `$HOME/.chatlet`
pub fn chatlet_home() -> std::path::PathBuf {
    if let Ok(p) = std::env::var("CHATLET_HOME") {
        std::path::PathBuf::from(p)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join(".chatlet")
    }
}
