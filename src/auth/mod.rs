//! Authentication module
//!
//! Implements the ecobee PIN grant:
//!
//! 1. `request_pin` asks for a PIN and an authorization code
//! 2. the user enters the PIN in the ecobee consumer portal
//! 3. `exchange_code` trades the code for an access/refresh token pair
//!
//! Access tokens expire after an hour; `refresh` renews them.

mod authenticator;
mod types;

pub use authenticator::PinAuthenticator;
pub use types::{AuthError, PinResponse, TokenResponse};

/// Where the user enters a PIN
pub const PORTAL_URL: &str = "https://www.ecobee.com/consumerportal/index.html#/my-apps";
