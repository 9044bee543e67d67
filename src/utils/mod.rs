//! Utilities Module
//!
//! Common utilities used across the crate.

mod cache;
mod http;
mod json;
mod rate_limiter;
pub mod config;
pub mod logging;

pub use cache::*;
pub use http::*;
pub use json::*;
pub use rate_limiter::*;
pub use config::WalletConfig;
