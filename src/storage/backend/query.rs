//! Ledger reads: raw month rows and SQL-side sums

use std::collections::BTreeMap;

use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, FromQueryResult, IdenStatic, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};
use tracing::trace;

use super::SeaOrmStorage;
use super::converters::{model_to_pipeline_values, pipeline_column};
use crate::aggregation::YearMonth;
use crate::errors::{KpiError, Result};
use crate::metrics::{ChannelId, Money, PipelineField};
use crate::storage::models::{
    ChannelDayMap, ChannelTotals, MonthlyTable, PipelineRows, PipelineValues,
};

use migration::entities::{kpi_channel_daily, kpi_pipeline_daily};

// ============ 查询结果类型 ============

/// 漏斗字段求和结果行
#[derive(Debug, Default, FromQueryResult)]
struct PipelineSumRow {
    calls: i64,
    appointments: i64,
    quotes: i64,
    quote_value_cents: i64,
    sales: i64,
    sales_value_cents: i64,
}

impl From<PipelineSumRow> for PipelineValues {
    fn from(row: PipelineSumRow) -> Self {
        PipelineValues {
            calls: row.calls,
            appointments: row.appointments,
            quotes: row.quotes,
            quote_value: Money::from_cents(row.quote_value_cents),
            sales: row.sales,
            sales_value: Money::from_cents(row.sales_value_cents),
        }
    }
}

/// 按月分组的漏斗求和结果行
#[derive(Debug, FromQueryResult)]
struct MonthlyPipelineRow {
    month: i64,
    calls: i64,
    appointments: i64,
    quotes: i64,
    quote_value_cents: i64,
    sales: i64,
    sales_value_cents: i64,
}

#[derive(Debug, FromQueryResult)]
struct ChannelSumRow {
    channel_id: i64,
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct MonthlyChannelRow {
    month: i64,
    channel_id: i64,
    total: i64,
}

// ============ 各数据库的 SQL 表达式 ============

/// 月份（1-12）
fn month_expr(backend: DbBackend) -> Expr {
    match backend {
        DbBackend::Sqlite => Expr::cust("CAST(strftime('%m', kpi_date) AS INTEGER)"),
        DbBackend::MySql => Expr::cust("CAST(MONTH(kpi_date) AS SIGNED)"),
        DbBackend::Postgres | _ => Expr::cust("CAST(EXTRACT(MONTH FROM kpi_date) AS BIGINT)"),
    }
}

/// 整数列求和，空集合为 0
fn sum_expr(backend: DbBackend, column: &str) -> Expr {
    match backend {
        DbBackend::Sqlite => Expr::cust(format!("COALESCE(SUM({}), 0)", column)),
        DbBackend::MySql => Expr::cust(format!("CAST(COALESCE(SUM({}), 0) AS SIGNED)", column)),
        DbBackend::Postgres | _ => {
            Expr::cust(format!("CAST(COALESCE(SUM({}), 0) AS BIGINT)", column))
        }
    }
}

fn query_error(what: &str, e: sea_orm::DbErr) -> KpiError {
    KpiError::database_operation(format!("{}失败: {}", what, e))
}

impl SeaOrmStorage {
    /// 某月有记录的日期 → 漏斗数据
    pub async fn get_month_pipeline_rows(
        &self,
        user_id: i64,
        month: YearMonth,
    ) -> Result<PipelineRows> {
        let models = kpi_pipeline_daily::Entity::find()
            .filter(kpi_pipeline_daily::Column::UserId.eq(user_id))
            .filter(kpi_pipeline_daily::Column::KpiDate.between(month.first_day(), month.last_day()))
            .order_by_asc(kpi_pipeline_daily::Column::KpiDate)
            .all(&self.db)
            .await
            .map_err(|e| query_error("查询月度漏斗数据", e))?;

        trace!("{} pipeline rows for user {} in {}", models.len(), user_id, month);
        Ok(models
            .iter()
            .map(|m| (m.kpi_date, model_to_pipeline_values(m)))
            .collect())
    }

    /// 某月有记录的日期 → 渠道 → 线索数
    pub async fn get_month_channel_map(
        &self,
        user_id: i64,
        month: YearMonth,
    ) -> Result<ChannelDayMap> {
        let models = kpi_channel_daily::Entity::find()
            .filter(kpi_channel_daily::Column::UserId.eq(user_id))
            .filter(kpi_channel_daily::Column::KpiDate.between(month.first_day(), month.last_day()))
            .order_by_asc(kpi_channel_daily::Column::KpiDate)
            .all(&self.db)
            .await
            .map_err(|e| query_error("查询月度渠道数据", e))?;

        let mut map = ChannelDayMap::new();
        for model in models {
            map.entry(model.kpi_date)
                .or_insert_with(BTreeMap::new)
                .insert(ChannelId(model.channel_id), model.value);
        }
        Ok(map)
    }

    /// 某月漏斗合计（SQL SUM）
    pub async fn get_month_pipeline_totals(
        &self,
        user_id: i64,
        month: YearMonth,
    ) -> Result<PipelineValues> {
        let backend = self.db_backend();
        let mut select = kpi_pipeline_daily::Entity::find().select_only();
        for field in PipelineField::all() {
            let column = pipeline_column(field).as_str();
            select = select.column_as(sum_expr(backend, column), column);
        }

        let row = select
            .filter(kpi_pipeline_daily::Column::UserId.eq(user_id))
            .filter(kpi_pipeline_daily::Column::KpiDate.between(month.first_day(), month.last_day()))
            .into_model::<PipelineSumRow>()
            .one(&self.db)
            .await
            .map_err(|e| query_error("汇总月度漏斗数据", e))?;

        Ok(row.unwrap_or_default().into())
    }

    /// 某月各渠道合计（SQL GROUP BY channel_id）
    pub async fn get_month_channel_totals(
        &self,
        user_id: i64,
        month: YearMonth,
    ) -> Result<ChannelTotals> {
        let rows = kpi_channel_daily::Entity::find()
            .select_only()
            .column(kpi_channel_daily::Column::ChannelId)
            .column_as(sum_expr(self.db_backend(), "value"), "total")
            .filter(kpi_channel_daily::Column::UserId.eq(user_id))
            .filter(kpi_channel_daily::Column::KpiDate.between(month.first_day(), month.last_day()))
            .group_by(kpi_channel_daily::Column::ChannelId)
            .into_model::<ChannelSumRow>()
            .all(&self.db)
            .await
            .map_err(|e| query_error("汇总月度渠道数据", e))?;

        Ok(rows
            .into_iter()
            .map(|row| (ChannelId(row.channel_id), row.total))
            .collect())
    }

    /// 全年按月的漏斗合计；没有记录的月份为 0
    pub async fn get_year_pipeline_monthly_totals(
        &self,
        user_id: i64,
        year: i32,
    ) -> Result<MonthlyTable<PipelineValues>> {
        let (first, last) = year_bounds(year)?;
        let backend = self.db_backend();
        let month = month_expr(backend);

        let mut select = kpi_pipeline_daily::Entity::find()
            .select_only()
            .column_as(month.clone(), "month");
        for field in PipelineField::all() {
            let column = pipeline_column(field).as_str();
            select = select.column_as(sum_expr(backend, column), column);
        }

        let rows = select
            .filter(kpi_pipeline_daily::Column::UserId.eq(user_id))
            .filter(kpi_pipeline_daily::Column::KpiDate.between(first, last))
            .group_by(month)
            .into_model::<MonthlyPipelineRow>()
            .all(&self.db)
            .await
            .map_err(|e| query_error("汇总年度漏斗数据", e))?;

        Ok(MonthlyTable::from_sparse(rows.into_iter().filter_map(|row| {
            let month = u32::try_from(row.month).ok()?;
            let values = PipelineValues::from(PipelineSumRow {
                calls: row.calls,
                appointments: row.appointments,
                quotes: row.quotes,
                quote_value_cents: row.quote_value_cents,
                sales: row.sales,
                sales_value_cents: row.sales_value_cents,
            });
            Some((month, values))
        })))
    }

    /// 全年按月的各渠道合计
    pub async fn get_year_channel_monthly_totals(
        &self,
        user_id: i64,
        year: i32,
    ) -> Result<MonthlyTable<ChannelTotals>> {
        let (first, last) = year_bounds(year)?;
        let backend = self.db_backend();
        let month = month_expr(backend);

        let rows = kpi_channel_daily::Entity::find()
            .select_only()
            .column_as(month.clone(), "month")
            .column(kpi_channel_daily::Column::ChannelId)
            .column_as(sum_expr(backend, "value"), "total")
            .filter(kpi_channel_daily::Column::UserId.eq(user_id))
            .filter(kpi_channel_daily::Column::KpiDate.between(first, last))
            .group_by(month)
            .group_by(kpi_channel_daily::Column::ChannelId)
            .into_model::<MonthlyChannelRow>()
            .all(&self.db)
            .await
            .map_err(|e| query_error("汇总年度渠道数据", e))?;

        let mut table: MonthlyTable<ChannelTotals> = MonthlyTable::new();
        for row in rows {
            let Ok(month) = u32::try_from(row.month) else {
                continue;
            };
            if let Some(totals) = table.get_mut(month) {
                totals.insert(ChannelId(row.channel_id), row.total);
            }
        }
        Ok(table)
    }

    /// 连接可用性检查
    pub async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| KpiError::database_connection(format!("数据库不可用: {}", e)))
    }
}

fn year_bounds(year: i32) -> Result<(chrono::NaiveDate, chrono::NaiveDate)> {
    let first = YearMonth::new(year, 1)?.first_day();
    let last = YearMonth::new(year, 12)?.last_day();
    Ok((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_expr_per_backend() {
        use sea_orm::sea_query::{PostgresQueryBuilder, Query, SqliteQueryBuilder};

        let sqlite = Query::select()
            .expr(sum_expr(DbBackend::Sqlite, "calls"))
            .to_string(SqliteQueryBuilder);
        assert!(sqlite.contains("COALESCE(SUM(calls), 0)"));

        let pg = Query::select()
            .expr(sum_expr(DbBackend::Postgres, "calls"))
            .to_string(PostgresQueryBuilder);
        assert!(pg.contains("AS BIGINT"));
    }

    #[test]
    fn test_year_bounds() {
        let (first, last) = year_bounds(2026).unwrap();
        assert_eq!(first.to_string(), "2026-01-01");
        assert_eq!(last.to_string(), "2026-12-31");
        assert!(year_bounds(1800).is_err());
    }
}
