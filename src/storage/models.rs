//! Ledger record types shared by the store and the aggregation engine

use std::collections::BTreeMap;
use std::ops::Add;

use serde::Serialize;
use ts_rs::TS;

use crate::metrics::{ChannelId, Money, PipelineField, TS_EXPORT_PATH};

/// A sanitized cell value, ready to be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricValue {
    Count(i64),
    Money(Money),
}

/// The six pipeline metrics of one day, or a sum over several days
///
/// A day without a stored record is `PipelineValues::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PipelineValues {
    #[ts(type = "number")]
    pub calls: i64,
    #[ts(type = "number")]
    pub appointments: i64,
    #[ts(type = "number")]
    pub quotes: i64,
    #[ts(type = "number")]
    pub quote_value: Money,
    #[ts(type = "number")]
    pub sales: i64,
    #[ts(type = "number")]
    pub sales_value: Money,
}

impl PipelineValues {
    pub fn get(&self, field: PipelineField) -> MetricValue {
        match field {
            PipelineField::Calls => MetricValue::Count(self.calls),
            PipelineField::Appointments => MetricValue::Count(self.appointments),
            PipelineField::Quotes => MetricValue::Count(self.quotes),
            PipelineField::QuoteValue => MetricValue::Money(self.quote_value),
            PipelineField::Sales => MetricValue::Count(self.sales),
            PipelineField::SalesValue => MetricValue::Money(self.sales_value),
        }
    }

    /// Overwrite the fields present in `patch`, keep the rest
    pub fn apply(&mut self, patch: &PipelinePatch) {
        for (field, value) in patch.iter() {
            match (field, value) {
                (PipelineField::Calls, MetricValue::Count(v)) => self.calls = v,
                (PipelineField::Appointments, MetricValue::Count(v)) => self.appointments = v,
                (PipelineField::Quotes, MetricValue::Count(v)) => self.quotes = v,
                (PipelineField::Sales, MetricValue::Count(v)) => self.sales = v,
                (PipelineField::QuoteValue, MetricValue::Money(m)) => self.quote_value = m,
                (PipelineField::SalesValue, MetricValue::Money(m)) => self.sales_value = m,
                // PipelinePatch::set 保证类型与字段一致
                _ => {}
            }
        }
    }
}

impl Add for PipelineValues {
    type Output = PipelineValues;

    /// Field-wise, clamping at `i64::MAX` like `Money`
    fn add(self, rhs: PipelineValues) -> PipelineValues {
        PipelineValues {
            calls: self.calls.saturating_add(rhs.calls),
            appointments: self.appointments.saturating_add(rhs.appointments),
            quotes: self.quotes.saturating_add(rhs.quotes),
            quote_value: self.quote_value + rhs.quote_value,
            sales: self.sales.saturating_add(rhs.sales),
            sales_value: self.sales_value + rhs.sales_value,
        }
    }
}

/// Partial pipeline write for one (user, date)
///
/// Only the fields present are replaced on conflict; on first insert the
/// missing fields are stored as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelinePatch {
    values: BTreeMap<PipelineField, MetricValue>,
}

impl PipelinePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field; a value whose kind does not match the field is ignored
    pub fn set(&mut self, field: PipelineField, value: MetricValue) -> bool {
        let matches = matches!(
            (field.is_money(), value),
            (true, MetricValue::Money(_)) | (false, MetricValue::Count(_))
        );
        if matches {
            self.values.insert(field, value);
        }
        matches
    }

    pub fn with(mut self, field: PipelineField, value: MetricValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: PipelineField) -> Option<MetricValue> {
        self.values.get(&field).copied()
    }

    pub fn contains(&self, field: PipelineField) -> bool {
        self.values.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PipelineField, MetricValue)> + '_ {
        self.values.iter().map(|(f, v)| (*f, *v))
    }

    /// Values as they would look on a fresh row
    pub fn to_values(&self) -> PipelineValues {
        let mut values = PipelineValues::default();
        values.apply(self);
        values
    }
}

/// date → pipeline values for the days that have a stored record
pub type PipelineRows = BTreeMap<chrono::NaiveDate, PipelineValues>;

/// date → channel → lead count for the days that have stored records
pub type ChannelDayMap = BTreeMap<chrono::NaiveDate, BTreeMap<ChannelId, i64>>;

/// channel → lead count
pub type ChannelTotals = BTreeMap<ChannelId, i64>;

/// Twelve entries keyed 1..=12; months without records hold `T::default()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTable<T> {
    months: [T; 12],
}

impl<T: Default> Default for MonthlyTable<T> {
    fn default() -> Self {
        Self {
            months: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T: Default> MonthlyTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from sparse `(month, value)` pairs; out-of-range months are dropped
    pub fn from_sparse<I: IntoIterator<Item = (u32, T)>>(entries: I) -> Self {
        let mut table = Self::default();
        for (month, value) in entries {
            if let Some(slot) = table.get_mut(month) {
                *slot = value;
            }
        }
        table
    }
}

impl<T> MonthlyTable<T> {
    pub fn get(&self, month: u32) -> Option<&T> {
        let idx = month.checked_sub(1)? as usize;
        self.months.get(idx)
    }

    pub fn get_mut(&mut self, month: u32) -> Option<&mut T> {
        let idx = month.checked_sub(1)? as usize;
        self.months.get_mut(idx)
    }

    /// `(month, value)` for months 1..=12
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.months
            .iter()
            .enumerate()
            .map(|(idx, value)| (idx as u32 + 1, value))
    }

    pub fn map<U, F: FnMut(u32, &T) -> U>(&self, mut f: F) -> MonthlyTable<U> {
        MonthlyTable {
            months: std::array::from_fn(|idx| f(idx as u32 + 1, &self.months[idx])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_rejects_mismatched_kind() {
        let mut patch = PipelinePatch::new();
        assert!(!patch.set(PipelineField::Calls, MetricValue::Money(Money::from_cents(5))));
        assert!(patch.set(PipelineField::Calls, MetricValue::Count(5)));
        assert_eq!(patch.len(), 1);
    }

    #[test]
    fn test_apply_keeps_absent_fields() {
        let mut day = PipelineValues {
            calls: 10,
            quote_value: Money::from_cents(5000),
            ..Default::default()
        };
        let patch = PipelinePatch::new().with(PipelineField::Appointments, MetricValue::Count(4));
        day.apply(&patch);
        assert_eq!(day.calls, 10);
        assert_eq!(day.appointments, 4);
        assert_eq!(day.quote_value, Money::from_cents(5000));
    }

    #[test]
    fn test_add_saturates() {
        let big = PipelineValues {
            calls: i64::MAX - 1,
            sales_value: Money::from_cents(i64::MAX),
            ..Default::default()
        };
        let sum = big + big;
        assert_eq!(sum.calls, i64::MAX);
        assert_eq!(sum.sales_value, Money::from_cents(i64::MAX));
        assert_eq!(sum.quotes, 0);
    }

    #[test]
    fn test_monthly_table_sparse_fills_zero() {
        let table = MonthlyTable::from_sparse([(2u32, 7i64), (12, 3), (13, 99)]);
        let values: Vec<i64> = table.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![0, 7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3]);
        assert!(table.get(0).is_none());
        assert!(table.get(13).is_none());
    }

    #[test]
    fn test_monthly_table_map_passes_month() {
        let table: MonthlyTable<i64> = MonthlyTable::new();
        let months = table.map(|m, _| m);
        assert_eq!(months.get(1), Some(&1));
        assert_eq!(months.get(12), Some(&12));
    }
}
