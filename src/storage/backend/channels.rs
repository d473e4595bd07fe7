//! 线索渠道（每个用户自己的一组渠道）

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::model_to_channel;
use crate::errors::{KpiError, Result};
use crate::metrics::{Channel, ChannelId, ChannelScope};

use migration::entities::kpi_channel;

/// 渠道名最大长度（与表结构一致）
pub const MAX_CHANNEL_NAME_LEN: usize = 191;

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(KpiError::validation("渠道名不能为空"));
    }
    if name.chars().count() > MAX_CHANNEL_NAME_LEN {
        return Err(KpiError::validation(format!(
            "渠道名过长（最多 {} 个字符）",
            MAX_CHANNEL_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

impl SeaOrmStorage {
    /// 按 (sort_order, id) 排序的渠道列表
    pub async fn list_channels(&self, user_id: i64, scope: ChannelScope) -> Result<Vec<Channel>> {
        let mut query = kpi_channel::Entity::find().filter(kpi_channel::Column::UserId.eq(user_id));
        if scope == ChannelScope::ActiveOnly {
            query = query.filter(kpi_channel::Column::IsActive.eq(true));
        }

        let models = query
            .order_by_asc(kpi_channel::Column::SortOrder)
            .order_by_asc(kpi_channel::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| KpiError::database_operation(format!("查询渠道失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_channel).collect())
    }

    /// 新建渠道，排在现有渠道之后
    pub async fn create_channel(&self, user_id: i64, name: &str, is_active: bool) -> Result<Channel> {
        let name = clean_name(name)?;

        let last_order: Option<i32> = kpi_channel::Entity::find()
            .select_only()
            .column(kpi_channel::Column::SortOrder)
            .filter(kpi_channel::Column::UserId.eq(user_id))
            .order_by_desc(kpi_channel::Column::SortOrder)
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(|e| KpiError::database_operation(format!("查询渠道排序失败: {}", e)))?;

        let model = kpi_channel::ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            is_active: Set(is_active),
            sort_order: Set(last_order.map_or(0, |order| order.saturating_add(1))),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| KpiError::database_operation(format!("创建渠道失败: {}", e)))?;

        info!("Channel created: user={} id={} name={}", user_id, model.id, model.name);
        Ok(model_to_channel(model))
    }

    /// 启用/停用渠道；停用的渠道仍计入历史合计
    pub async fn set_channel_active(
        &self,
        user_id: i64,
        channel_id: ChannelId,
        is_active: bool,
    ) -> Result<Channel> {
        let existing = kpi_channel::Entity::find_by_id(channel_id.0)
            .filter(kpi_channel::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| KpiError::database_operation(format!("查询渠道失败: {}", e)))?
            .ok_or_else(|| KpiError::not_found(format!("渠道不存在: {}", channel_id)))?;

        let mut active: kpi_channel::ActiveModel = existing.into();
        active.is_active = Set(is_active);
        let model = active
            .update(&self.db)
            .await
            .map_err(|e| KpiError::database_operation(format!("更新渠道失败: {}", e)))?;

        info!(
            "Channel {}: user={} id={}",
            if is_active { "enabled" } else { "disabled" },
            user_id,
            channel_id
        );
        Ok(model_to_channel(model))
    }

    /// 用户没有任何渠道时写入默认渠道，返回全部渠道
    pub async fn ensure_default_channels(
        &self,
        user_id: i64,
        names: &[String],
    ) -> Result<Vec<Channel>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| KpiError::database_operation(format!("开始事务失败: {}", e)))?;

        let existing = kpi_channel::Entity::find()
            .filter(kpi_channel::Column::UserId.eq(user_id))
            .count(&txn)
            .await
            .map_err(|e| KpiError::database_operation(format!("查询渠道失败: {}", e)))?;

        if existing == 0 {
            let now = Utc::now();
            let models: Vec<kpi_channel::ActiveModel> = names
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .enumerate()
                .map(|(order, name)| kpi_channel::ActiveModel {
                    user_id: Set(user_id),
                    name: Set(name.to_string()),
                    is_active: Set(true),
                    sort_order: Set(order as i32),
                    created_at: Set(now),
                    ..Default::default()
                })
                .collect();

            if !models.is_empty() {
                let seeded = models.len();
                kpi_channel::Entity::insert_many(models)
                    .exec(&txn)
                    .await
                    .map_err(|e| {
                        KpiError::database_operation(format!("写入默认渠道失败: {}", e))
                    })?;
                info!("Seeded {} default channels for user {}", seeded, user_id);
            }
        }

        txn.commit()
            .await
            .map_err(|e| KpiError::database_operation(format!("提交事务失败: {}", e)))?;

        self.list_channels(user_id, ChannelScope::AllKnown).await
    }
}
