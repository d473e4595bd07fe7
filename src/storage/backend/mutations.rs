//! Ledger writes
//!
//! Every write is an upsert on the natural key, so replaying the same batch
//! leaves the same rows behind.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, TransactionTrait, sea_query::OnConflict};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{
    channel_value_to_active_model, pipeline_column, pipeline_patch_to_active_model,
};
use super::retry;
use crate::aggregation::PatchPlan;
use crate::errors::{KpiError, Result};
use crate::metrics::ChannelId;
use crate::storage::models::PipelinePatch;

use migration::entities::{kpi_channel_daily, kpi_pipeline_daily};

/// (user, date) 上的部分字段 upsert：冲突时只覆盖 patch 中出现的列
async fn upsert_pipeline<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    date: NaiveDate,
    patch: &PipelinePatch,
    now: DateTime<Utc>,
) -> std::result::Result<(), DbErr> {
    let mut update_columns: Vec<kpi_pipeline_daily::Column> =
        patch.iter().map(|(field, _)| pipeline_column(field)).collect();
    update_columns.push(kpi_pipeline_daily::Column::UpdatedAt);

    kpi_pipeline_daily::Entity::insert(pipeline_patch_to_active_model(user_id, date, patch, now))
        .on_conflict(
            OnConflict::columns([
                kpi_pipeline_daily::Column::UserId,
                kpi_pipeline_daily::Column::KpiDate,
            ])
            .update_columns(update_columns)
            .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

async fn upsert_channel<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    channel_id: ChannelId,
    date: NaiveDate,
    value: i64,
    now: DateTime<Utc>,
) -> std::result::Result<(), DbErr> {
    kpi_channel_daily::Entity::insert(channel_value_to_active_model(
        user_id, channel_id, date, value, now,
    ))
    .on_conflict(
        OnConflict::columns([
            kpi_channel_daily::Column::UserId,
            kpi_channel_daily::Column::ChannelId,
            kpi_channel_daily::Column::KpiDate,
        ])
        .update_columns([
            kpi_channel_daily::Column::Value,
            kpi_channel_daily::Column::UpdatedAt,
        ])
        .to_owned(),
    )
    .exec(conn)
    .await?;
    Ok(())
}

impl SeaOrmStorage {
    pub async fn upsert_pipeline_day(
        &self,
        user_id: i64,
        date: NaiveDate,
        patch: &PipelinePatch,
    ) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let db = &self.db;
        let now = Utc::now();
        retry::with_retry(
            &format!("upsert_pipeline_day({}, {})", user_id, date),
            self.retry_config,
            || async move { upsert_pipeline(db, user_id, date, patch, now).await },
        )
        .await
        .map_err(|e| KpiError::database_operation(format!("写入漏斗日数据失败: {}", e)))?;

        debug!(
            "Pipeline day upserted: user={} date={} fields={}",
            user_id,
            date,
            patch.len()
        );
        Ok(())
    }

    pub async fn upsert_channel_day(
        &self,
        user_id: i64,
        channel_id: ChannelId,
        date: NaiveDate,
        value: i64,
    ) -> Result<()> {
        let db = &self.db;
        let now = Utc::now();
        retry::with_retry(
            &format!("upsert_channel_day({}, {}, {})", user_id, channel_id, date),
            self.retry_config,
            || async move { upsert_channel(db, user_id, channel_id, date, value, now).await },
        )
        .await
        .map_err(|e| KpiError::database_operation(format!("写入渠道日数据失败: {}", e)))?;

        debug!(
            "Channel day upserted: user={} channel={} date={} value={}",
            user_id, channel_id, date, value
        );
        Ok(())
    }

    /// 在一个事务中写入整个批次，返回 upsert 次数
    pub async fn write_patch(&self, user_id: i64, plan: &PatchPlan) -> Result<usize> {
        if plan.is_empty() {
            return Ok(0);
        }

        let db = &self.db;
        let now = Utc::now();
        retry::with_retry(
            &format!("write_patch({})", user_id),
            self.retry_config,
            || async move {
                let txn = db.begin().await?;
                for (date, patch) in plan.pipeline.iter().filter(|(_, p)| !p.is_empty()) {
                    upsert_pipeline(&txn, user_id, *date, patch, now).await?;
                }
                for ((channel_id, date), value) in &plan.channels {
                    upsert_channel(&txn, user_id, *channel_id, *date, *value, now).await?;
                }
                txn.commit().await
            },
        )
        .await
        .map_err(|e| KpiError::database_operation(format!("批量写入失败: {}", e)))?;

        let writes = plan.write_count();
        info!(
            "Patch written: user={} pipeline_days={} channel_cells={}",
            user_id,
            plan.pipeline.len(),
            plan.channels.len()
        );
        Ok(writes)
    }
}
