//! Presentation adapter
//!
//! Turns engine numbers into display strings. Currency symbol and decimal
//! counts come from the `[display]` config section.

mod format;

pub use format::{DisplayOptions, format_integer, format_money, format_percent};
