//! Core domain types for nte.

pub mod config;
pub mod events;
pub mod hooks;
pub mod journal;
pub mod listing;
pub mod shell;
pub mod store;
pub mod todo;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
