//! Date window partitioning
//!
//! The runtime report endpoint limits how many days one request may cover,
//! so an archive run is split into consecutive fixed-size windows that each
//! become one request, one bulk upload and one archive file.

mod routers;
mod types;

pub use routers::{parse_date, DateWindowRouter};
pub use types::DateWindow;
