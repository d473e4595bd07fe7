//! 每年参与 YTD 计算的月份

use chrono::Utc;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, sea_query::OnConflict};
use tracing::info;

use super::SeaOrmStorage;
use super::retry;
use crate::aggregation::{ActiveMonths, calendar::validate_year};
use crate::errors::{KpiError, Result};

use migration::entities::kpi_active_months;

impl SeaOrmStorage {
    /// 读取已保存的活跃月份；从未保存过时返回 None
    pub async fn get_active_months(&self, user_id: i64, year: i32) -> Result<Option<ActiveMonths>> {
        let model = kpi_active_months::Entity::find()
            .filter(kpi_active_months::Column::UserId.eq(user_id))
            .filter(kpi_active_months::Column::Year.eq(year))
            .one(&self.db)
            .await
            .map_err(|e| KpiError::database_operation(format!("查询活跃月份失败: {}", e)))?;

        Ok(model.map(|m| ActiveMonths::from_mask((m.months & 0x0FFF) as u16)))
    }

    pub async fn set_active_months(
        &self,
        user_id: i64,
        year: i32,
        months: ActiveMonths,
    ) -> Result<()> {
        validate_year(year)?;

        let db = &self.db;
        let now = Utc::now();
        retry::with_retry(
            &format!("set_active_months({}, {})", user_id, year),
            self.retry_config,
            || async move {
                let model = kpi_active_months::ActiveModel {
                    user_id: Set(user_id),
                    year: Set(year),
                    months: Set(i32::from(months.mask())),
                    updated_at: Set(now),
                    ..Default::default()
                };
                kpi_active_months::Entity::insert(model)
                    .on_conflict(
                        OnConflict::columns([
                            kpi_active_months::Column::UserId,
                            kpi_active_months::Column::Year,
                        ])
                        .update_columns([
                            kpi_active_months::Column::Months,
                            kpi_active_months::Column::UpdatedAt,
                        ])
                        .to_owned(),
                    )
                    .exec(db)
                    .await
                    .map(|_| ())
            },
        )
        .await
        .map_err(|e| KpiError::database_operation(format!("保存活跃月份失败: {}", e)))?;

        info!(
            "Active months saved: user={} year={} count={}",
            user_id,
            year,
            months.count()
        );
        Ok(())
    }
}
