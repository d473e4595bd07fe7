//! Submitted-value sanitization
//!
//! Money is rounded to cents, counts to the nearest whole number, both half
//! away from zero. Rounding starts from the shortest decimal text of the
//! submitted number, so `19.995` becomes `20.00` rather than `19.99`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::metrics::{MetricKind, Money};
use crate::storage::models::MetricValue;

use super::patch::RejectReason;

/// Largest count accepted for one cell
///
/// A year of daily cells summed across every channel stays far below
/// `i64::MAX`, in the engine and in SQL `SUM` alike.
pub const MAX_COUNT: i64 = 1_000_000_000;

/// Largest money amount accepted for one cell, in cents (1,000,000,000.00)
pub const MAX_MONEY_CENTS: i64 = 100_000_000_000;

/// Turn a raw JSON cell value into a stored value
///
/// `null` and empty strings count as 0. Numeric strings are accepted.
pub fn sanitize_value(kind: MetricKind, raw: &Value) -> Result<MetricValue, RejectReason> {
    let number = match raw {
        Value::Null => 0.0,
        Value::Number(n) => n.as_f64().ok_or(RejectReason::NonNumeric)?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed
                    .parse::<f64>()
                    .map_err(|_| RejectReason::NonNumeric)?
            }
        }
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            return Err(RejectReason::NonNumeric);
        }
    };

    if !number.is_finite() {
        return Err(RejectReason::NonNumeric);
    }
    if number < 0.0 {
        return Err(RejectReason::Negative);
    }

    match kind {
        MetricKind::Count => round_count(number)
            .map(MetricValue::Count)
            .ok_or(RejectReason::OutOfRange),
        MetricKind::Money => round_money(number)
            .map(MetricValue::Money)
            .ok_or(RejectReason::OutOfRange),
    }
}

/// Nearest whole number, half away from zero (`4.5 → 5`)
pub fn round_count(value: f64) -> Option<i64> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded.abs() > MAX_COUNT as f64 {
        return None;
    }
    Some(rounded as i64)
}

/// Round to two decimals, half away from zero, as cents
pub fn round_money(value: f64) -> Option<Money> {
    if !value.is_finite() {
        return None;
    }
    if value.abs() < 1e-9 {
        return Some(Money::ZERO);
    }
    // 远超上限的值不必走 Decimal 解析
    if value.abs() > (MAX_MONEY_CENTS / 100 + 1) as f64 {
        return None;
    }
    let mut decimal = Decimal::from_str(&value.to_string()).ok()?;
    decimal = decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    decimal.rescale(2);
    let cents = i64::try_from(decimal.mantissa()).ok()?;
    if cents.abs() > MAX_MONEY_CENTS {
        return None;
    }
    Some(Money::from_cents(cents))
}
