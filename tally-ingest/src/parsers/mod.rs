//! Cell-level parsers for statement values.

pub mod amount;
pub mod date;

pub use amount::{parse_amount, parse_indicator, Direction};
pub use date::parse_date;
