//! Vendor request status
//!
//! Every ecobee response embeds `{"status": {"code": n, "message": "..."}}`.
//! Code 0 is success; everything else is an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status codes returned by the ecobee API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ResponseCode {
    Success,
    AuthenticationFailed,
    NotAuthorized,
    ProcessingError,
    SerializationError,
    InvalidRequestFormat,
    TooManyThermostats,
    ValidationError,
    InvalidFunction,
    InvalidSelection,
    InvalidPage,
    FunctionError,
    PostNotSupported,
    GetNotSupported,
    TokenExpired,
    DuplicateData,
    TokenDeauthorized,
    Unknown(i64),
}

impl ResponseCode {
    /// Numeric wire value
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Success => 0,
            Self::AuthenticationFailed => 1,
            Self::NotAuthorized => 2,
            Self::ProcessingError => 3,
            Self::SerializationError => 4,
            Self::InvalidRequestFormat => 5,
            Self::TooManyThermostats => 6,
            Self::ValidationError => 7,
            Self::InvalidFunction => 8,
            Self::InvalidSelection => 9,
            Self::InvalidPage => 10,
            Self::FunctionError => 11,
            Self::PostNotSupported => 12,
            Self::GetNotSupported => 13,
            Self::TokenExpired => 14,
            Self::DuplicateData => 15,
            Self::TokenDeauthorized => 16,
            Self::Unknown(n) => n,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// The vendor's description of this code
    pub fn description(self) -> String {
        let text = match self {
            Self::Success => "Your request was successfully received and processed.",
            Self::AuthenticationFailed => "Invalid credentials supplied to the registration request, or invalid token. Request registration again.",
            Self::NotAuthorized => "Attempted to access resources which user is not authorized for. Ensure the thermostat identifiers requested are correct.",
            Self::ProcessingError => "General catch-all error for a number of internal errors. Additional info may be provided in the message. Check your request. Contact support if persists.",
            Self::SerializationError => "An internal error mapping data to or from the API transmission format. Contact support.",
            Self::InvalidRequestFormat => "An error mapping the request data to internal data objects. Ensure that the properties being sent match properties in the specification.",
            Self::TooManyThermostats => "Too many identifiers are specified in the Selecton.selectionMatch property. Current limit is 25 per request.",
            Self::ValidationError => "The update request contained values out of range or too large for the field being updated. See the additional message information as to what caused the validation failure.",
            Self::InvalidFunction => "The \"type\" property of the function does not match an available function. Check your request parameters.",
            Self::InvalidSelection => "The Selection.selectionType property contains an invalid value.",
            Self::InvalidPage => "The page requested in the request is invalid. Occurs if the page is less than 1 or more than the number of available pages for the request.",
            Self::FunctionError => "An error occurred processing a function. Ensure required properties are provided.",
            Self::PostNotSupported => "The request URL does not support POST.",
            Self::GetNotSupported => "The request URL does not support GET.",
            Self::TokenExpired => "Token expired. Please refresh.",
            Self::DuplicateData => "Fix the data which is duplicated and re-post.",
            Self::TokenDeauthorized => "Token has been deauthorized by user. You must re-request authorization.",
            Self::Unknown(n) => return format!("unknown response code: {n}"),
        };
        text.to_string()
    }
}

impl From<i64> for ResponseCode {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::AuthenticationFailed,
            2 => Self::NotAuthorized,
            3 => Self::ProcessingError,
            4 => Self::SerializationError,
            5 => Self::InvalidRequestFormat,
            6 => Self::TooManyThermostats,
            7 => Self::ValidationError,
            8 => Self::InvalidFunction,
            9 => Self::InvalidSelection,
            10 => Self::InvalidPage,
            11 => Self::FunctionError,
            12 => Self::PostNotSupported,
            13 => Self::GetNotSupported,
            14 => Self::TokenExpired,
            15 => Self::DuplicateData,
            16 => Self::TokenDeauthorized,
            n => Self::Unknown(n),
        }
    }
}

impl From<ResponseCode> for i64 {
    fn from(code: ResponseCode) -> Self {
        code.as_i64()
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// The `status` object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    pub code: ResponseCode,
    #[serde(default)]
    pub message: String,
}

impl Default for ApiStatus {
    fn default() -> Self {
        Self {
            code: ResponseCode::Success,
            message: String::new(),
        }
    }
}

/// Envelope used to read only the status out of any response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestStatus {
    /// Absent on proxy and gateway error bodies
    #[serde(default)]
    pub status: Option<ApiStatus>,
}
