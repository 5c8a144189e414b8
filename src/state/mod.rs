//! Credential state module
//!
//! Holds the app key, OAuth tokens and the thermostat id cache between runs.
//!
//! # Overview
//!
//! - `AppContext` - the credentials themselves
//! - `CredentialStore` - JSON file persistence with atomic writes

mod manager;
mod types;

pub use manager::CredentialStore;
pub use types::AppContext;
