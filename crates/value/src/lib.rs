pub mod compare;
pub mod format;
pub mod value;
#[cfg(test)]
mod tests;

pub use compare::{is_same_value, TOLERANCE};
pub use format::{format_date, format_float, format_value};
pub use value::Value;
