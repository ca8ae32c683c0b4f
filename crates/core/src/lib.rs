pub mod config;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod model;
pub mod probe;
pub mod shutdown;

pub use config::Config;
pub use error::{CoreError, Result};
pub use inventory::HardwareInventory;
pub use metrics::TelemetrySampler;
pub use model::*;
