//! ecobee API module
//!
//! Status-checked access to the thermostat and runtime report endpoints.
//!
//! # Overview
//!
//! - `EcobeeClient` - authenticated requests with transparent token refresh
//! - `ResponseCode` / `ApiStatus` - the status object embedded in every body
//! - `Thermostat`, `RuntimeReportRequest` - request and response bodies

mod client;
mod status;
mod types;

pub use client::EcobeeClient;
pub use status::{ApiStatus, RequestStatus, ResponseCode};
pub use types::{RuntimeReportRequest, Selection, Thermostat, ThermostatRequest, RUNTIME_COLUMNS};
