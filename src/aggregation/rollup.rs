//! Monthly rollups, year-to-date sums and averages
//!
//! A month counts towards YTD and the average iff it is flagged active,
//! whether or not it holds any data.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::metrics::{Channel, ChannelScope, Money, PipelineField, TS_EXPORT_PATH};
use crate::storage::models::{ChannelTotals, MetricValue, MonthlyTable, PipelineValues};

use super::ratios::{DerivedStats, StatKind, Unit, derived_ratio};
use super::totals::{Accumulate, total_leads};

/// Twelve active-month flags for one (user, year), stored as a 12-bit mask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ActiveMonths(u16);

impl ActiveMonths {
    const ALL: u16 = 0x0FFF;

    pub fn none() -> Self {
        ActiveMonths(0)
    }

    pub fn all() -> Self {
        ActiveMonths(Self::ALL)
    }

    /// Bits above the twelfth are dropped
    pub fn from_mask(mask: u16) -> Self {
        ActiveMonths(mask & Self::ALL)
    }

    pub fn from_months<I: IntoIterator<Item = u32>>(months: I) -> Self {
        let mut active = Self::none();
        for month in months {
            active.set(month, true);
        }
        active
    }

    pub fn mask(self) -> u16 {
        self.0
    }

    pub fn is_active(self, month: u32) -> bool {
        (1..=12).contains(&month) && self.0 & (1 << (month - 1)) != 0
    }

    pub fn set(&mut self, month: u32, active: bool) {
        if !(1..=12).contains(&month) {
            return;
        }
        let bit = 1u16 << (month - 1);
        if active {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn months(self) -> impl Iterator<Item = u32> {
        (1..=12u32).filter(move |m| self.is_active(*m))
    }

    /// Flags to use when nothing has been saved for `year`: the current
    /// month if `year` is the current year, otherwise none
    pub fn default_for(year: i32, today: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        if today.year() == year {
            Self::from_months([today.month()])
        } else {
            Self::none()
        }
    }

    pub fn to_flags(self) -> [bool; 12] {
        std::array::from_fn(|idx| self.is_active(idx as u32 + 1))
    }
}

/// Sum of the active months
pub fn ytd_sum<T: Accumulate>(table: &MonthlyTable<T>, active: ActiveMonths) -> T {
    table
        .iter()
        .filter(|(month, _)| active.is_active(*month))
        .map(|(_, value)| *value)
        .fold(T::default(), T::accumulate)
}

/// YTD divided by the number of active months, 0 when none is active
pub fn ytd_average(ytd: f64, active: ActiveMonths) -> f64 {
    derived_ratio(ytd, active.count() as f64)
}

/// Totals of one calendar month
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthRollup {
    pub pipeline: PipelineValues,
    pub channels: ChannelTotals,
    pub leads: i64,
    pub stats: DerivedStats,
}

/// Per-month totals of a year; months without records are all-zero
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRollup {
    pub year: i32,
    pub scope: ChannelScope,
    pub months: MonthlyTable<MonthRollup>,
}

impl MonthlyRollup {
    pub fn build(
        year: i32,
        pipeline: &MonthlyTable<PipelineValues>,
        channels_by_month: &MonthlyTable<ChannelTotals>,
        channels: &[Channel],
        scope: ChannelScope,
    ) -> Self {
        let months = pipeline.map(|month, totals| {
            let channel_totals = channels_by_month.get(month).cloned().unwrap_or_default();
            let leads = total_leads(channels, scope, &channel_totals);
            MonthRollup {
                pipeline: *totals,
                channels: channel_totals,
                leads,
                stats: DerivedStats::compute(totals, leads),
            }
        });
        Self {
            year,
            scope,
            months,
        }
    }

    fn column<T: Default>(&self, f: impl Fn(&MonthRollup) -> T) -> MonthlyTable<T> {
        self.months.map(|_, entry| f(entry))
    }
}

/// Section of the yearly grid a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Leads,
    Pipeline,
    Stats,
}

/// One row of the yearly grid: 12 monthly values, YTD and average
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct YearRow {
    pub key: String,
    pub label: String,
    pub section: Section,
    pub unit: Unit,
    pub months: Vec<f64>,
    pub ytd: f64,
    pub average: f64,
}

/// Yearly grid built from a rollup and the active-month flags
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct YearSummary {
    pub year: i32,
    pub active_months: Vec<bool>,
    pub active_count: u32,
    pub rows: Vec<YearRow>,
}

pub const TOTAL_LEADS_KEY: &str = "total_leads";

impl YearSummary {
    pub fn build(rollup: &MonthlyRollup, channels: &[Channel], active: ActiveMonths) -> Self {
        let mut rows = Vec::new();

        for channel in channels.iter().filter(|c| rollup.scope.includes(c)) {
            let table =
                rollup.column(|m| m.channels.get(&channel.id).copied().unwrap_or_default());
            rows.push(count_row(
                channel.key(),
                channel.name.clone(),
                Section::Leads,
                &table,
                active,
            ));
        }
        let leads = rollup.column(|m| m.leads);
        rows.push(count_row(
            TOTAL_LEADS_KEY.to_string(),
            "Total Number Of Leads".to_string(),
            Section::Leads,
            &leads,
            active,
        ));

        for field in PipelineField::all() {
            let row = if field.is_money() {
                let table = rollup.column(|m| match m.pipeline.get(field) {
                    MetricValue::Money(v) => v,
                    MetricValue::Count(_) => Money::ZERO,
                });
                money_row(field, &table, active)
            } else {
                let table = rollup.column(|m| match m.pipeline.get(field) {
                    MetricValue::Count(v) => v,
                    MetricValue::Money(_) => 0,
                });
                count_row(
                    field.to_string(),
                    field.label().to_string(),
                    Section::Pipeline,
                    &table,
                    active,
                )
            };
            rows.push(row);
        }

        let ytd_pipeline = ytd_sum(&rollup.column(|m| m.pipeline), active);
        let ytd_leads = ytd_sum(&leads, active);
        for kind in StatKind::all() {
            let monthly = rollup.column(|m| m.stats.get(kind));
            let mean = ytd_average(
                monthly
                    .iter()
                    .filter(|(month, _)| active.is_active(*month))
                    .map(|(_, v)| *v)
                    .sum(),
                active,
            );
            rows.push(YearRow {
                key: kind.to_string(),
                label: kind.label().to_string(),
                section: Section::Stats,
                unit: kind.unit(),
                months: monthly.iter().map(|(_, v)| *v).collect(),
                ytd: kind.compute(&ytd_pipeline, ytd_leads),
                average: mean,
            });
        }

        Self {
            year: rollup.year,
            active_months: active.to_flags().to_vec(),
            active_count: active.count(),
            rows,
        }
    }

    pub fn row(&self, key: &str) -> Option<&YearRow> {
        self.rows.iter().find(|row| row.key == key)
    }
}

fn count_row(
    key: String,
    label: String,
    section: Section,
    table: &MonthlyTable<i64>,
    active: ActiveMonths,
) -> YearRow {
    let ytd = ytd_sum(table, active) as f64;
    YearRow {
        key,
        label,
        section,
        unit: Unit::Count,
        months: table.iter().map(|(_, v)| *v as f64).collect(),
        ytd,
        average: ytd_average(ytd, active),
    }
}

fn money_row(field: PipelineField, table: &MonthlyTable<Money>, active: ActiveMonths) -> YearRow {
    let ytd = ytd_sum(table, active).to_f64();
    YearRow {
        key: field.to_string(),
        label: field.label().to_string(),
        section: Section::Pipeline,
        unit: Unit::Money,
        months: table.iter().map(|(_, v)| v.to_f64()).collect(),
        ytd,
        average: ytd_average(ytd, active),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ChannelId;

    fn channel(id: i64, active: bool) -> Channel {
        Channel {
            id: ChannelId(id),
            name: format!("Channel {}", id),
            is_active: active,
            sort_order: 0,
        }
    }

    fn sales_table(entries: &[(u32, i64)]) -> MonthlyTable<PipelineValues> {
        MonthlyTable::from_sparse(entries.iter().map(|(m, sales)| {
            (
                *m,
                PipelineValues {
                    sales: *sales,
                    ..Default::default()
                },
            )
        }))
    }

    #[test]
    fn test_active_months_mask() {
        let mut active = ActiveMonths::from_months([1, 3]);
        assert_eq!(active.mask(), 0b101);
        assert!(active.is_active(3));
        assert!(!active.is_active(2));
        assert!(!active.is_active(13));
        active.set(3, false);
        assert_eq!(active.count(), 1);
        assert_eq!(ActiveMonths::from_mask(0xFFFF), ActiveMonths::all());
    }

    #[test]
    fn test_default_active_months() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 5, 17).unwrap();
        assert_eq!(
            ActiveMonths::default_for(2026, today).months().collect::<Vec<_>>(),
            vec![5]
        );
        assert!(ActiveMonths::default_for(2025, today).is_empty());
    }

    #[test]
    fn test_ytd_counts_only_active_months() {
        let pipeline = sales_table(&[(1, 10), (2, 999), (3, 20)]);
        let rollup = MonthlyRollup::build(
            2026,
            &pipeline,
            &MonthlyTable::new(),
            &[],
            ChannelScope::AllKnown,
        );
        let active = ActiveMonths::from_months([1, 3]);
        let summary = YearSummary::build(&rollup, &[], active);

        let sales = summary.row("sales").unwrap();
        assert_eq!(sales.ytd, 30.0);
        assert_eq!(sales.average, 15.0);
        assert_eq!(sales.months[1], 999.0);
    }

    #[test]
    fn test_active_month_without_data_still_counts() {
        let pipeline = sales_table(&[(1, 10)]);
        let rollup = MonthlyRollup::build(
            2026,
            &pipeline,
            &MonthlyTable::new(),
            &[],
            ChannelScope::AllKnown,
        );
        let summary = YearSummary::build(&rollup, &[], ActiveMonths::from_months([1, 2]));
        let sales = summary.row("sales").unwrap();
        assert_eq!(sales.ytd, 10.0);
        assert_eq!(sales.average, 5.0);
    }

    #[test]
    fn test_no_active_month_gives_zero_average() {
        let pipeline = sales_table(&[(4, 10)]);
        let rollup = MonthlyRollup::build(
            2026,
            &pipeline,
            &MonthlyTable::new(),
            &[],
            ChannelScope::AllKnown,
        );
        let summary = YearSummary::build(&rollup, &[], ActiveMonths::none());
        let sales = summary.row("sales").unwrap();
        assert_eq!(sales.ytd, 0.0);
        assert_eq!(sales.average, 0.0);
    }

    #[test]
    fn test_ytd_clamps_instead_of_overflowing() {
        let entries: Vec<(u32, i64)> = (1..=12).map(|m| (m, i64::MAX / 4)).collect();
        let rollup = MonthlyRollup::build(
            2026,
            &sales_table(&entries),
            &MonthlyTable::new(),
            &[],
            ChannelScope::AllKnown,
        );
        let summary = YearSummary::build(&rollup, &[], ActiveMonths::all());
        assert_eq!(summary.row("sales").unwrap().ytd, i64::MAX as f64);
    }

    #[test]
    fn test_empty_months_are_zero_entries() {
        let rollup = MonthlyRollup::build(
            2026,
            &MonthlyTable::new(),
            &MonthlyTable::new(),
            &[channel(1, true)],
            ChannelScope::AllKnown,
        );
        for (_, entry) in rollup.months.iter() {
            assert_eq!(entry.pipeline, PipelineValues::default());
            assert_eq!(entry.leads, 0);
            assert_eq!(entry.stats, DerivedStats::default());
        }
        assert_eq!(rollup.months.iter().count(), 12);
    }

    #[test]
    fn test_ratio_rows_use_ytd_totals_and_monthly_mean() {
        let pipeline = MonthlyTable::from_sparse([
            (
                1u32,
                PipelineValues {
                    calls: 10,
                    appointments: 5,
                    ..Default::default()
                },
            ),
            (
                2,
                PipelineValues {
                    calls: 30,
                    appointments: 3,
                    ..Default::default()
                },
            ),
        ]);
        let rollup = MonthlyRollup::build(
            2026,
            &pipeline,
            &MonthlyTable::new(),
            &[],
            ChannelScope::AllKnown,
        );
        let summary = YearSummary::build(&rollup, &[], ActiveMonths::from_months([1, 2]));
        let row = summary.row("apps_from_calls").unwrap();
        assert_eq!(row.months[0], 0.5);
        assert_eq!(row.months[1], 0.1);
        // 8 / 40
        assert_eq!(row.ytd, 0.2);
        assert_eq!(row.average, (0.5 + 0.1) / 2.0);
    }

    #[test]
    fn test_leads_rows_follow_scope() {
        let channels = vec![channel(1, true), channel(2, false)];
        let by_month = MonthlyTable::from_sparse([(
            1u32,
            ChannelTotals::from([(ChannelId(1), 5), (ChannelId(2), 7)]),
        )]);
        let active = ActiveMonths::from_months([1]);

        let all = MonthlyRollup::build(
            2026,
            &MonthlyTable::new(),
            &by_month,
            &channels,
            ChannelScope::AllKnown,
        );
        let summary = YearSummary::build(&all, &channels, active);
        assert_eq!(summary.row(TOTAL_LEADS_KEY).unwrap().ytd, 12.0);
        assert!(summary.row("lead_2").is_some());

        let active_only = MonthlyRollup::build(
            2026,
            &MonthlyTable::new(),
            &by_month,
            &channels,
            ChannelScope::ActiveOnly,
        );
        let summary = YearSummary::build(&active_only, &channels, active);
        assert_eq!(summary.row(TOTAL_LEADS_KEY).unwrap().ytd, 5.0);
        assert!(summary.row("lead_2").is_none());
    }
}
