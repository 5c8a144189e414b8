//! CLI module
//!
//! Command-line interface for elastibee.
//!
//! # Commands
//!
//! - `pin` - Request a PIN and authorize the app
//! - `token` - Exchange an authorization code for tokens
//! - `refresh` - Refresh the stored access token
//! - `archive` - Archive runtime reports into Elasticsearch

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
