pub mod series;
pub mod time;
pub mod units;

pub use series::*;
pub use time::*;
pub use units::*;
