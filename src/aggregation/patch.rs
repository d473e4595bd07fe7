//! Edit-patch planning
//!
//! A batch of `{date, key, value}` cell edits is parsed once into typed
//! writes: pipeline edits are grouped into a single upsert per date, channel
//! edits become one upsert per (channel, date). Bad entries are collected in
//! `rejected` and never stop the rest of the batch.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::metrics::{ChannelId, MetricKey, TS_EXPORT_PATH};
use crate::storage::models::{MetricValue, PipelinePatch};

use super::calendar::{YearMonth, parse_date, validate_year};
use super::sanitize::sanitize_value;

/// One cell edit as sent by the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct EditChange {
    pub date: String,
    pub key: String,
    #[serde(default)]
    #[ts(type = "number | string | null")]
    pub value: serde_json::Value,
}

/// Why a single edit was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidDate,
    OutsideMonth,
    UnknownKey,
    NonNumeric,
    Negative,
    OutOfRange,
    ChannelNotFound,
}

impl RejectReason {
    pub fn message(self) -> &'static str {
        match self {
            RejectReason::InvalidDate => "date must be a valid YYYY-MM-DD",
            RejectReason::OutsideMonth => "date is outside the month being saved",
            RejectReason::UnknownKey => "unknown metric key",
            RejectReason::NonNumeric => "value is not a number",
            RejectReason::Negative => "value must not be negative",
            RejectReason::OutOfRange => "value is out of range",
            RejectReason::ChannelNotFound => "channel not found",
        }
    }
}

/// An edit that was left out of the write set
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RejectedChange {
    pub index: usize,
    pub date: String,
    pub key: String,
    pub reason: RejectReason,
    pub message: String,
}

/// Typed write set produced from a batch
///
/// Repeated edits of the same cell keep the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchPlan {
    pub pipeline: BTreeMap<NaiveDate, PipelinePatch>,
    pub channels: BTreeMap<(ChannelId, NaiveDate), i64>,
    pub accepted: usize,
    pub rejected: Vec<RejectedChange>,
}

impl PatchPlan {
    /// Number of upserts the plan turns into
    pub fn write_count(&self) -> usize {
        self.pipeline.len() + self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.write_count() == 0
    }
}

/// Plan a batch of edits
///
/// `owned_channels` is the set of channel ids the acting user owns; any
/// other channel id is rejected. With `within` set, every date must fall in
/// that month.
pub fn plan_patch(
    changes: &[EditChange],
    owned_channels: &HashSet<ChannelId>,
    within: Option<YearMonth>,
) -> PatchPlan {
    let mut plan = PatchPlan::default();

    for (index, change) in changes.iter().enumerate() {
        match plan_one(change, owned_channels, within) {
            Ok((date, MetricKey::Pipeline(field), value)) => {
                plan.pipeline.entry(date).or_default().set(field, value);
                plan.accepted += 1;
            }
            Ok((date, MetricKey::Channel(channel_id), MetricValue::Count(value))) => {
                plan.channels.insert((channel_id, date), value);
                plan.accepted += 1;
            }
            Ok((_, MetricKey::Channel(_), MetricValue::Money(_))) => {
                // MetricKey::kind() 保证渠道值始终为 Count
                plan.rejected
                    .push(rejection(index, change, RejectReason::OutOfRange));
            }
            Err(reason) => plan.rejected.push(rejection(index, change, reason)),
        }
    }

    plan
}

fn plan_one(
    change: &EditChange,
    owned_channels: &HashSet<ChannelId>,
    within: Option<YearMonth>,
) -> Result<(NaiveDate, MetricKey, MetricValue), RejectReason> {
    let date = parse_date(&change.date).map_err(|_| RejectReason::InvalidDate)?;
    validate_year(YearMonth::of(date).year()).map_err(|_| RejectReason::InvalidDate)?;
    if let Some(month) = within
        && !month.contains(date)
    {
        return Err(RejectReason::OutsideMonth);
    }

    let key: MetricKey = change
        .key
        .trim()
        .parse()
        .map_err(|_| RejectReason::UnknownKey)?;
    if let MetricKey::Channel(channel_id) = key
        && !owned_channels.contains(&channel_id)
    {
        return Err(RejectReason::ChannelNotFound);
    }

    let value = sanitize_value(key.kind(), &change.value)?;
    Ok((date, key, value))
}

fn rejection(index: usize, change: &EditChange, reason: RejectReason) -> RejectedChange {
    RejectedChange {
        index,
        date: change.date.clone(),
        key: change.key.clone(),
        reason,
        message: reason.message().to_string(),
    }
}

/// Flatten a full-month grid `{date → {key → value}}` into edits
pub fn flatten_month_grid(
    grid: &BTreeMap<String, BTreeMap<String, serde_json::Value>>,
) -> Vec<EditChange> {
    grid.iter()
        .flat_map(|(date, cells)| {
            cells.iter().map(move |(key, value)| EditChange {
                date: date.clone(),
                key: key.clone(),
                value: value.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Money, PipelineField};
    use serde_json::json;

    fn change(date: &str, key: &str, value: serde_json::Value) -> EditChange {
        EditChange {
            date: date.to_string(),
            key: key.to_string(),
            value,
        }
    }

    fn owned(ids: &[i64]) -> HashSet<ChannelId> {
        ids.iter().map(|id| ChannelId(*id)).collect()
    }

    fn date(d: &str) -> NaiveDate {
        parse_date(d).unwrap()
    }

    #[test]
    fn test_groups_pipeline_changes_per_date() {
        let changes = vec![
            change("2026-03-04", "calls", json!(10)),
            change("2026-03-04", "appointments", json!(4)),
            change("2026-03-05", "sales_value", json!(19.995)),
        ];
        let plan = plan_patch(&changes, &owned(&[]), None);

        assert_eq!(plan.accepted, 3);
        assert_eq!(plan.pipeline.len(), 2);
        let day = &plan.pipeline[&date("2026-03-04")];
        assert_eq!(day.get(PipelineField::Calls), Some(MetricValue::Count(10)));
        assert_eq!(
            day.get(PipelineField::Appointments),
            Some(MetricValue::Count(4))
        );
        assert!(!day.contains(PipelineField::Quotes));
        assert_eq!(
            plan.pipeline[&date("2026-03-05")].get(PipelineField::SalesValue),
            Some(MetricValue::Money(Money::from_cents(2000)))
        );
    }

    #[test]
    fn test_routes_channel_changes() {
        let changes = vec![
            change("2026-03-04", "lead_1", json!(4.5)),
            change("2026-03-04", "lead_2", json!("3")),
        ];
        let plan = plan_patch(&changes, &owned(&[1, 2]), None);
        assert_eq!(plan.channels[&(ChannelId(1), date("2026-03-04"))], 5);
        assert_eq!(plan.channels[&(ChannelId(2), date("2026-03-04"))], 3);
        assert!(plan.pipeline.is_empty());
        assert_eq!(plan.write_count(), 2);
    }

    #[test]
    fn test_partial_success_reports_each_rejection() {
        let changes = vec![
            change("2026-03-04", "calls", json!(1)),
            change("2026-02-30", "calls", json!(1)),
            change("2026-03-04", "revenue", json!(1)),
            change("2026-03-04", "quotes", json!("many")),
            change("2026-03-04", "sales", json!(-1)),
            change("2026-03-04", "lead_9", json!(1)),
        ];
        let plan = plan_patch(&changes, &owned(&[1]), None);

        assert_eq!(plan.accepted, 1);
        let reasons: Vec<_> = plan.rejected.iter().map(|r| (r.index, r.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (1, RejectReason::InvalidDate),
                (2, RejectReason::UnknownKey),
                (3, RejectReason::NonNumeric),
                (4, RejectReason::Negative),
                (5, RejectReason::ChannelNotFound),
            ]
        );
        assert_eq!(plan.rejected[4].key, "lead_9");
    }

    #[test]
    fn test_last_edit_of_a_cell_wins() {
        let changes = vec![
            change("2026-03-04", "calls", json!(1)),
            change("2026-03-04", "calls", json!(7)),
        ];
        let plan = plan_patch(&changes, &owned(&[]), None);
        assert_eq!(
            plan.pipeline[&date("2026-03-04")].get(PipelineField::Calls),
            Some(MetricValue::Count(7))
        );
        assert_eq!(plan.accepted, 2);
        assert_eq!(plan.write_count(), 1);
    }

    #[test]
    fn test_within_month_rejects_other_dates() {
        let month = YearMonth::new(2026, 3).unwrap();
        let changes = vec![
            change("2026-03-31", "calls", json!(1)),
            change("2026-04-01", "calls", json!(1)),
        ];
        let plan = plan_patch(&changes, &owned(&[]), Some(month));
        assert_eq!(plan.accepted, 1);
        assert_eq!(plan.rejected[0].reason, RejectReason::OutsideMonth);
    }

    #[test]
    fn test_flatten_month_grid() {
        let mut grid = BTreeMap::new();
        grid.insert(
            "2026-03-02".to_string(),
            BTreeMap::from([
                ("calls".to_string(), json!(3)),
                ("lead_1".to_string(), json!(2)),
            ]),
        );
        grid.insert(
            "2026-03-01".to_string(),
            BTreeMap::from([("sales".to_string(), json!(1))]),
        );
        let changes = flatten_month_grid(&grid);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].date, "2026-03-01");
    }
}
