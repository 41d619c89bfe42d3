pub mod baseline;
pub mod config;
pub mod metrics;
mod profile;
pub mod similarity;

pub use baseline::*;
pub use config::*;
pub use metrics::*;
pub use similarity::*;
