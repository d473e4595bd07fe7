//! 漏斗日数据实体（金额单位：分）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "kpi_pipeline_daily")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub kpi_date: Date,
    pub calls: i64,
    pub appointments: i64,
    pub quotes: i64,
    pub quote_value_cents: i64,
    pub sales: i64,
    pub sales_value_cents: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
