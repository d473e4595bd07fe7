//! KPI service
//!
//! Orchestrates the ledger store and the aggregation engine for one user at
//! a time. Every read recomputes aggregates from stored records; every write
//! goes through `plan_patch` so the HTTP and CLI paths validate identically.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::aggregation::patch::flatten_month_grid;
use crate::aggregation::rollup::TOTAL_LEADS_KEY;
use crate::aggregation::totals::{channel_row_total, day_leads};
use crate::aggregation::{
    ActiveMonths, DerivedStats, EditChange, MonthlyRollup, RejectedChange, StatKind, Unit,
    YearMonth, YearSummary, month_channel_totals, month_pipeline_totals, plan_patch, total_leads,
};
use crate::config::StaticConfig;
use crate::errors::{KpiError, Result};
use crate::metrics::{Channel, ChannelId, ChannelScope, PipelineField, TS_EXPORT_PATH};
use crate::presentation::DisplayOptions;
use crate::storage::{LedgerStore, MetricValue, PipelineValues};

use super::context::RequestContext;

// ============ Response DTOs ============

/// One calendar day of the monthly entry grid
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct DayRow {
    pub date: NaiveDate,
    pub pipeline: PipelineValues,
    /// `lead_<id>` → count, for the channels in scope
    #[ts(type = "Record<string, number>")]
    pub channels: BTreeMap<String, i64>,
    #[ts(type = "number")]
    pub leads: i64,
}

/// Grand totals of the month
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct MonthTotals {
    pub pipeline: PipelineValues,
    #[ts(type = "Record<string, number>")]
    pub channels: BTreeMap<String, i64>,
    /// Leads over active channels only
    #[ts(type = "number")]
    pub leads_active: i64,
    /// Leads over every channel the user owns
    #[ts(type = "number")]
    pub leads_all: i64,
}

/// A formatted summary value
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct SummaryCard {
    pub key: String,
    pub label: String,
    pub unit: Unit,
    pub value: f64,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub scope: ChannelScope,
    pub channels: Vec<Channel>,
    pub days: Vec<DayRow>,
    pub totals: MonthTotals,
    pub stats: DerivedStats,
    pub cards: Vec<SummaryCard>,
}

/// A yearly grid row with its display strings
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct FormattedRow {
    pub key: String,
    pub label: String,
    pub months: Vec<String>,
    pub ytd: String,
    pub average: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct YearView {
    pub scope: ChannelScope,
    pub channels: Vec<Channel>,
    pub summary: YearSummary,
    pub formatted: Vec<FormattedRow>,
}

/// Outcome of a batch write
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PatchResult {
    /// Entries accepted into the write set
    pub saved: usize,
    /// Upserts executed (cells of one day are merged into one pipeline write)
    pub writes: usize,
    pub rejected: Vec<RejectedChange>,
}

// ============ KpiService Implementation ============

pub struct KpiService {
    store: Arc<dyn LedgerStore>,
    display: DisplayOptions,
    default_channels: Vec<String>,
    max_batch_size: usize,
    today: Option<NaiveDate>,
}

impl KpiService {
    pub fn new(store: Arc<dyn LedgerStore>, config: &StaticConfig) -> Self {
        Self {
            store,
            display: DisplayOptions::from_config(&config.display),
            default_channels: config.channels.defaults.clone(),
            max_batch_size: config.api.max_batch_size,
            today: None,
        }
    }

    /// Pin "today" (used for the default active month)
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn display(&self) -> &DisplayOptions {
        &self.display
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// All channels of the user, seeding the defaults on first use
    async fn all_channels(&self, ctx: &RequestContext) -> Result<Vec<Channel>> {
        self.store
            .ensure_default_channels(ctx.user_id, &self.default_channels)
            .await
    }

    // ============ Reads ============

    pub async fn list_channels(
        &self,
        ctx: &RequestContext,
        scope: ChannelScope,
    ) -> Result<Vec<Channel>> {
        let channels = self.all_channels(ctx).await?;
        Ok(channels.into_iter().filter(|c| scope.includes(c)).collect())
    }

    /// Daily grid, totals and statistics for one month
    pub async fn get_month(
        &self,
        ctx: &RequestContext,
        year: i32,
        month: u32,
        scope: ChannelScope,
    ) -> Result<MonthView> {
        let ym = YearMonth::new(year, month)?;
        let channels = self.all_channels(ctx).await?;
        let rows = self.store.get_month_pipeline_rows(ctx.user_id, ym).await?;
        let channel_map = self.store.get_month_channel_map(ctx.user_id, ym).await?;

        let in_scope: Vec<&Channel> = channels.iter().filter(|c| scope.includes(c)).collect();
        let empty = BTreeMap::new();
        let days = ym
            .dates()
            .map(|date| {
                let per_channel = channel_map.get(&date).unwrap_or(&empty);
                DayRow {
                    date,
                    pipeline: rows.get(&date).copied().unwrap_or_default(),
                    channels: in_scope
                        .iter()
                        .map(|c| (c.key(), per_channel.get(&c.id).copied().unwrap_or(0)))
                        .collect(),
                    leads: day_leads(&channels, scope, per_channel),
                }
            })
            .collect();

        let pipeline = month_pipeline_totals(&rows, ym);
        let channel_totals = month_channel_totals(&channel_map, ym);
        let leads_active = total_leads(&channels, ChannelScope::ActiveOnly, &channel_totals);
        let leads_all = total_leads(&channels, ChannelScope::AllKnown, &channel_totals);
        let leads = match scope {
            ChannelScope::ActiveOnly => leads_active,
            ChannelScope::AllKnown => leads_all,
        };
        let stats = DerivedStats::compute(&pipeline, leads);

        let totals = MonthTotals {
            pipeline,
            channels: in_scope
                .iter()
                .map(|c| (c.key(), channel_row_total(&channel_map, c.id, ym)))
                .collect(),
            leads_active,
            leads_all,
        };

        debug!(
            request_id = %ctx.request_id,
            "get_month: user={} {} rows={} channels={}",
            ctx.user_id,
            ym,
            rows.len(),
            channels.len()
        );

        Ok(MonthView {
            year,
            month,
            days_in_month: ym.days(),
            scope,
            cards: self.month_cards(&pipeline, leads, &stats),
            channels,
            days,
            totals,
            stats,
        })
    }

    fn month_cards(
        &self,
        pipeline: &PipelineValues,
        leads: i64,
        stats: &DerivedStats,
    ) -> Vec<SummaryCard> {
        let mut cards = Vec::with_capacity(16);
        cards.push(self.card(TOTAL_LEADS_KEY, "Total Number Of Leads", Unit::Count, leads as f64));
        for field in PipelineField::all() {
            let (unit, value) = match pipeline.get(field) {
                MetricValue::Count(v) => (Unit::Count, v as f64),
                MetricValue::Money(m) => (Unit::Money, m.to_f64()),
            };
            cards.push(self.card(field.as_ref(), field.label(), unit, value));
        }
        for kind in StatKind::all() {
            cards.push(self.card(kind.as_ref(), kind.label(), kind.unit(), stats.get(kind)));
        }
        cards
    }

    fn card(&self, key: &str, label: &str, unit: Unit, value: f64) -> SummaryCard {
        SummaryCard {
            key: key.to_string(),
            label: label.to_string(),
            unit,
            value,
            display: self.display.format(unit, value),
        }
    }

    /// Active months of `year`, falling back to the current month of the current year
    pub async fn active_months(&self, ctx: &RequestContext, year: i32) -> Result<ActiveMonths> {
        let saved = self.store.get_active_months(ctx.user_id, year).await?;
        Ok(saved.unwrap_or_else(|| ActiveMonths::default_for(year, self.today())))
    }

    /// Twelve monthly entries plus YTD and average rows
    pub async fn get_year(
        &self,
        ctx: &RequestContext,
        year: i32,
        scope: ChannelScope,
    ) -> Result<YearView> {
        crate::aggregation::calendar::validate_year(year)?;
        let channels = self.all_channels(ctx).await?;
        let pipeline = self
            .store
            .get_year_pipeline_monthly_totals(ctx.user_id, year)
            .await?;
        let channel_totals = self
            .store
            .get_year_channel_monthly_totals(ctx.user_id, year)
            .await?;
        let active = self.active_months(ctx, year).await?;

        let rollup = MonthlyRollup::build(year, &pipeline, &channel_totals, &channels, scope);
        let summary = YearSummary::build(&rollup, &channels, active);
        let formatted = summary
            .rows
            .iter()
            .map(|row| FormattedRow {
                key: row.key.clone(),
                label: row.label.clone(),
                months: row
                    .months
                    .iter()
                    .map(|v| self.display.format_monthly(row.unit, *v))
                    .collect(),
                ytd: self.display.format(row.unit, row.ytd),
                average: self.display.format(row.unit, row.average),
            })
            .collect();

        debug!(
            request_id = %ctx.request_id,
            "get_year: user={} year={} active_months={}",
            ctx.user_id,
            year,
            active.count()
        );

        Ok(YearView {
            scope,
            channels,
            summary,
            formatted,
        })
    }

    // ============ Writes ============

    /// Apply a batch of cell edits; bad entries are reported, the rest is saved
    pub async fn apply_patch(
        &self,
        ctx: &RequestContext,
        changes: &[EditChange],
    ) -> Result<PatchResult> {
        self.apply_within(ctx, changes, None).await
    }

    /// Save a full month grid `{date → {key → value}}`
    pub async fn save_month(
        &self,
        ctx: &RequestContext,
        year: i32,
        month: u32,
        grid: &BTreeMap<String, BTreeMap<String, serde_json::Value>>,
    ) -> Result<PatchResult> {
        let ym = YearMonth::new(year, month)?;
        let changes = flatten_month_grid(grid);
        self.apply_within(ctx, &changes, Some(ym)).await
    }

    async fn apply_within(
        &self,
        ctx: &RequestContext,
        changes: &[EditChange],
        within: Option<YearMonth>,
    ) -> Result<PatchResult> {
        if changes.len() > self.max_batch_size {
            return Err(KpiError::validation(format!(
                "too many changes in one batch: {} (max {})",
                changes.len(),
                self.max_batch_size
            )));
        }

        let owned: HashSet<ChannelId> = self
            .all_channels(ctx)
            .await?
            .iter()
            .map(|c| c.id)
            .collect();
        let plan = plan_patch(changes, &owned, within);

        for rejected in &plan.rejected {
            warn!(
                request_id = %ctx.request_id,
                "Rejected change #{} ({} / {}): {}",
                rejected.index,
                rejected.date,
                rejected.key,
                rejected.message
            );
        }

        let writes = self.store.write_patch(ctx.user_id, &plan).await?;

        info!(
            request_id = %ctx.request_id,
            "Saved {} of {} changes for user {} ({} upserts)",
            plan.accepted,
            changes.len(),
            ctx.user_id,
            writes
        );

        Ok(PatchResult {
            saved: plan.accepted,
            writes,
            rejected: plan.rejected,
        })
    }

    // ============ Channel / preference management ============

    pub async fn create_channel(
        &self,
        ctx: &RequestContext,
        name: &str,
        is_active: bool,
    ) -> Result<Channel> {
        // 先写入默认渠道，避免新渠道之后默认渠道不再生成
        self.all_channels(ctx).await?;
        self.store.create_channel(ctx.user_id, name, is_active).await
    }

    pub async fn set_channel_active(
        &self,
        ctx: &RequestContext,
        channel_id: ChannelId,
        is_active: bool,
    ) -> Result<Channel> {
        self.store
            .set_channel_active(ctx.user_id, channel_id, is_active)
            .await
    }

    pub async fn set_active_months(
        &self,
        ctx: &RequestContext,
        year: i32,
        months: ActiveMonths,
    ) -> Result<()> {
        self.store.set_active_months(ctx.user_id, year, months).await
    }
}
