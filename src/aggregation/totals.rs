//! Row totals and grand totals over one month

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::metrics::{Channel, ChannelId, ChannelScope, Money};
use crate::storage::models::{ChannelDayMap, ChannelTotals, PipelineRows, PipelineValues};

use super::calendar::YearMonth;

/// Addition used by every engine sum; clamps at `i64::MAX` instead of
/// overflowing
pub trait Accumulate: Copy + Default {
    fn accumulate(self, rhs: Self) -> Self;
}

impl Accumulate for i64 {
    fn accumulate(self, rhs: i64) -> i64 {
        self.saturating_add(rhs)
    }
}

impl Accumulate for Money {
    fn accumulate(self, rhs: Money) -> Money {
        self + rhs
    }
}

impl Accumulate for PipelineValues {
    fn accumulate(self, rhs: PipelineValues) -> PipelineValues {
        self + rhs
    }
}

/// Sum one metric over days 1..=days_in_month; missing days contribute 0
pub fn row_total<T: Accumulate>(values_by_day: &BTreeMap<NaiveDate, T>, month: YearMonth) -> T {
    month
        .dates()
        .map(|date| values_by_day.get(&date).copied().unwrap_or_default())
        .fold(T::default(), T::accumulate)
}

/// Grand total of all pipeline metrics for the month
pub fn month_pipeline_totals(rows: &PipelineRows, month: YearMonth) -> PipelineValues {
    row_total(rows, month)
}

/// Per-channel totals for the month, covering every channel that has data
pub fn month_channel_totals(map: &ChannelDayMap, month: YearMonth) -> ChannelTotals {
    let mut totals = ChannelTotals::new();
    for (date, per_channel) in map {
        if !month.contains(*date) {
            continue;
        }
        for (channel_id, value) in per_channel {
            let total = totals.entry(*channel_id).or_insert(0);
            *total = total.accumulate(*value);
        }
    }
    totals
}

/// Lead count of one channel across the month
pub fn channel_row_total(map: &ChannelDayMap, channel_id: ChannelId, month: YearMonth) -> i64 {
    let by_day: BTreeMap<NaiveDate, i64> = map
        .iter()
        .filter_map(|(date, per_channel)| per_channel.get(&channel_id).map(|v| (*date, *v)))
        .collect();
    row_total(&by_day, month)
}

/// Sum of per-channel totals restricted to the channels selected by `scope`
///
/// Totals for channels the user no longer owns are never counted.
pub fn total_leads(channels: &[Channel], scope: ChannelScope, totals: &ChannelTotals) -> i64 {
    channels
        .iter()
        .filter(|channel| scope.includes(channel))
        .map(|channel| totals.get(&channel.id).copied().unwrap_or(0))
        .fold(0, i64::accumulate)
}

/// Leads recorded on a single day, restricted by `scope`
pub fn day_leads(channels: &[Channel], scope: ChannelScope, day: &BTreeMap<ChannelId, i64>) -> i64 {
    total_leads(channels, scope, day)
}
