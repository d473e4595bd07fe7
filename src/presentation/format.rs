//! Display formatting: integers, money and percentages
//!
//! All formatters clamp negatives to 0 first.

use serde::{Deserialize, Serialize};

use crate::aggregation::Unit;

/// Formatting options, normally taken from the `[display]` config section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub currency_symbol: String,
    pub money_decimals: usize,
    pub monthly_money_decimals: usize,
    pub percent_decimals: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            money_decimals: 2,
            monthly_money_decimals: 0,
            percent_decimals: 2,
        }
    }
}

impl DisplayOptions {
    pub fn from_config(config: &crate::config::DisplayConfig) -> Self {
        Self {
            currency_symbol: config.currency_symbol.clone(),
            money_decimals: config.money_decimals,
            monthly_money_decimals: config.monthly_money_decimals,
            percent_decimals: config.percent_decimals,
        }
    }

    pub fn integer(&self, value: f64) -> String {
        format_integer(value)
    }

    pub fn money(&self, value: f64) -> String {
        format_money(value, &self.currency_symbol, self.money_decimals)
    }

    /// Money as shown in the monthly (yearly grid) cells
    pub fn monthly_money(&self, value: f64) -> String {
        format_money(value, &self.currency_symbol, self.monthly_money_decimals)
    }

    pub fn percent(&self, ratio: f64) -> String {
        format_percent(ratio, self.percent_decimals)
    }

    pub fn format(&self, unit: Unit, value: f64) -> String {
        match unit {
            Unit::Count => self.integer(value),
            Unit::Money => self.money(value),
            Unit::Percent => self.percent(value),
        }
    }

    /// Same as `format`, but money uses the monthly grid precision
    pub fn format_monthly(&self, unit: Unit, value: f64) -> String {
        match unit {
            Unit::Money => self.monthly_money(value),
            _ => self.format(unit, value),
        }
    }
}

fn clamp(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Rounded whole number, no grouping (`12.6 → "13"`)
pub fn format_integer(value: f64) -> String {
    format!("{}", clamp(value).round() as i64)
}

/// Currency symbol + thousands-grouped value with fixed decimals
///
/// `format_money(1234567.891, "$", 2) == "$1,234,567.89"`
pub fn format_money(value: f64, symbol: &str, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, round_half_away(clamp(value), decimals));
    let (whole, frac) = match fixed.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (fixed.as_str(), None),
    };
    let mut out = String::with_capacity(fixed.len() + symbol.len() + whole.len() / 3);
    out.push_str(symbol);
    out.push_str(&group_thousands(whole));
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Ratio × 100 with fixed decimals and a `%` suffix (`0.4 → "40.00%"`)
pub fn format_percent(ratio: f64, decimals: usize) -> String {
    format!(
        "{:.*}%",
        decimals,
        round_half_away(clamp(ratio) * 100.0, decimals)
    )
}

fn round_half_away(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals.min(15) as i32);
    let scaled = (value * factor).round() / factor;
    if scaled.is_finite() { scaled } else { value }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_integer() {
        assert_eq!(format_integer(12.4), "12");
        assert_eq!(format_integer(4.5), "5");
        assert_eq!(format_integer(-3.0), "0");
        assert_eq!(format_integer(f64::NAN), "0");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1234567.891, "$", 2), "$1,234,567.89");
        assert_eq!(format_money(999.0, "$", 2), "$999.00");
        assert_eq!(format_money(1000.0, "$", 0), "$1,000");
        assert_eq!(format_money(0.0, "€", 2), "€0.00");
        assert_eq!(format_money(-50.0, "$", 2), "$0.00");
        assert_eq!(format_money(20.0, "$", 2), "$20.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.4, 2), "40.00%");
        assert_eq!(format_percent(0.0, 2), "0.00%");
        assert_eq!(format_percent(1.0 / 3.0, 1), "33.3%");
        assert_eq!(format_percent(-0.2, 2), "0.00%");
    }

    #[test]
    fn test_display_options_dispatch() {
        let opts = DisplayOptions::default();
        assert_eq!(opts.format(Unit::Count, 7.0), "7");
        assert_eq!(opts.format(Unit::Money, 1500.5), "$1,500.50");
        assert_eq!(opts.format_monthly(Unit::Money, 1500.5), "$1,501");
        assert_eq!(opts.format(Unit::Percent, 0.25), "25.00%");
    }
}
