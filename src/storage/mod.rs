//! Daily ledger store
//!
//! One pipeline record per (user, date), one channel record per
//! (user, channel, date), plus the channel list and the active-months
//! preference. A missing record reads as zero.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::aggregation::{ActiveMonths, PatchPlan, YearMonth};
use crate::config::DatabaseConfig;
use crate::errors::Result;
use crate::metrics::{Channel, ChannelId, ChannelScope};

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{
    ChannelDayMap, ChannelTotals, MetricValue, MonthlyTable, PipelinePatch, PipelineRows,
    PipelineValues,
};

/// Storage seam used by the service layer
#[async_trait]
pub trait LedgerStore: Send + Sync {
    fn backend_name(&self) -> &str;

    async fn ping(&self) -> Result<()>;

    async fn upsert_pipeline_day(
        &self,
        user_id: i64,
        date: NaiveDate,
        patch: &PipelinePatch,
    ) -> Result<()>;

    async fn upsert_channel_day(
        &self,
        user_id: i64,
        channel_id: ChannelId,
        date: NaiveDate,
        value: i64,
    ) -> Result<()>;

    /// Write a planned batch atomically; returns the number of upserts
    async fn write_patch(&self, user_id: i64, plan: &PatchPlan) -> Result<usize>;

    async fn get_month_pipeline_rows(&self, user_id: i64, month: YearMonth)
    -> Result<PipelineRows>;

    async fn get_month_channel_map(&self, user_id: i64, month: YearMonth) -> Result<ChannelDayMap>;

    async fn get_month_pipeline_totals(
        &self,
        user_id: i64,
        month: YearMonth,
    ) -> Result<PipelineValues>;

    async fn get_month_channel_totals(&self, user_id: i64, month: YearMonth)
    -> Result<ChannelTotals>;

    async fn get_year_pipeline_monthly_totals(
        &self,
        user_id: i64,
        year: i32,
    ) -> Result<MonthlyTable<PipelineValues>>;

    async fn get_year_channel_monthly_totals(
        &self,
        user_id: i64,
        year: i32,
    ) -> Result<MonthlyTable<ChannelTotals>>;

    async fn list_channels(&self, user_id: i64, scope: ChannelScope) -> Result<Vec<Channel>>;

    async fn create_channel(&self, user_id: i64, name: &str, is_active: bool) -> Result<Channel>;

    async fn set_channel_active(
        &self,
        user_id: i64,
        channel_id: ChannelId,
        is_active: bool,
    ) -> Result<Channel>;

    async fn ensure_default_channels(&self, user_id: i64, names: &[String])
    -> Result<Vec<Channel>>;

    async fn get_active_months(&self, user_id: i64, year: i32) -> Result<Option<ActiveMonths>>;

    async fn set_active_months(&self, user_id: i64, year: i32, months: ActiveMonths)
    -> Result<()>;
}

#[async_trait]
impl LedgerStore for SeaOrmStorage {
    fn backend_name(&self) -> &str {
        SeaOrmStorage::backend_name(self)
    }

    async fn ping(&self) -> Result<()> {
        SeaOrmStorage::ping(self).await
    }

    async fn upsert_pipeline_day(
        &self,
        user_id: i64,
        date: NaiveDate,
        patch: &PipelinePatch,
    ) -> Result<()> {
        SeaOrmStorage::upsert_pipeline_day(self, user_id, date, patch).await
    }

    async fn upsert_channel_day(
        &self,
        user_id: i64,
        channel_id: ChannelId,
        date: NaiveDate,
        value: i64,
    ) -> Result<()> {
        SeaOrmStorage::upsert_channel_day(self, user_id, channel_id, date, value).await
    }

    async fn write_patch(&self, user_id: i64, plan: &PatchPlan) -> Result<usize> {
        SeaOrmStorage::write_patch(self, user_id, plan).await
    }

    async fn get_month_pipeline_rows(
        &self,
        user_id: i64,
        month: YearMonth,
    ) -> Result<PipelineRows> {
        SeaOrmStorage::get_month_pipeline_rows(self, user_id, month).await
    }

    async fn get_month_channel_map(&self, user_id: i64, month: YearMonth) -> Result<ChannelDayMap> {
        SeaOrmStorage::get_month_channel_map(self, user_id, month).await
    }

    async fn get_month_pipeline_totals(
        &self,
        user_id: i64,
        month: YearMonth,
    ) -> Result<PipelineValues> {
        SeaOrmStorage::get_month_pipeline_totals(self, user_id, month).await
    }

    async fn get_month_channel_totals(
        &self,
        user_id: i64,
        month: YearMonth,
    ) -> Result<ChannelTotals> {
        SeaOrmStorage::get_month_channel_totals(self, user_id, month).await
    }

    async fn get_year_pipeline_monthly_totals(
        &self,
        user_id: i64,
        year: i32,
    ) -> Result<MonthlyTable<PipelineValues>> {
        SeaOrmStorage::get_year_pipeline_monthly_totals(self, user_id, year).await
    }

    async fn get_year_channel_monthly_totals(
        &self,
        user_id: i64,
        year: i32,
    ) -> Result<MonthlyTable<ChannelTotals>> {
        SeaOrmStorage::get_year_channel_monthly_totals(self, user_id, year).await
    }

    async fn list_channels(&self, user_id: i64, scope: ChannelScope) -> Result<Vec<Channel>> {
        SeaOrmStorage::list_channels(self, user_id, scope).await
    }

    async fn create_channel(&self, user_id: i64, name: &str, is_active: bool) -> Result<Channel> {
        SeaOrmStorage::create_channel(self, user_id, name, is_active).await
    }

    async fn set_channel_active(
        &self,
        user_id: i64,
        channel_id: ChannelId,
        is_active: bool,
    ) -> Result<Channel> {
        SeaOrmStorage::set_channel_active(self, user_id, channel_id, is_active).await
    }

    async fn ensure_default_channels(
        &self,
        user_id: i64,
        names: &[String],
    ) -> Result<Vec<Channel>> {
        SeaOrmStorage::ensure_default_channels(self, user_id, names).await
    }

    async fn get_active_months(&self, user_id: i64, year: i32) -> Result<Option<ActiveMonths>> {
        SeaOrmStorage::get_active_months(self, user_id, year).await
    }

    async fn set_active_months(
        &self,
        user_id: i64,
        year: i32,
        months: ActiveMonths,
    ) -> Result<()> {
        SeaOrmStorage::set_active_months(self, user_id, year, months).await
    }
}

pub struct StorageFactory;

impl StorageFactory {
    /// 创建存储并执行迁移
    pub async fn create_with(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        let storage = SeaOrmStorage::new(config).await?;
        Ok(Arc::new(storage))
    }
}
