pub mod config;
pub mod error;
pub mod osmand;
pub mod position;
pub mod uplink;
pub mod webhook;

pub use config::{PayloadKeys, RelayConfig};
pub use error::RelayError;
