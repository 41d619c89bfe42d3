pub mod exclusion;
pub mod holidays;

pub use exclusion::*;
pub use holidays::{is_swedish_holiday, is_us_federal_holiday, us_federal_holidays};
