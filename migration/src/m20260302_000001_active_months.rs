//! 年度活跃月份偏好表
//!
//! 每个用户每年一行，`months` 为 12 位掩码（bit 0 = 一月）。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(KpiActiveMonths::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KpiActiveMonths::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(KpiActiveMonths::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(KpiActiveMonths::Year).integer().not_null())
                    .col(
                        ColumnDef::new(KpiActiveMonths::Months)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiActiveMonths::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_kpi_active_months_user_year")
                    .table(KpiActiveMonths::Table)
                    .col(KpiActiveMonths::UserId)
                    .col(KpiActiveMonths::Year)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_kpi_active_months_user_year")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(KpiActiveMonths::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum KpiActiveMonths {
    #[sea_orm(iden = "kpi_active_months")]
    Table,
    Id,
    UserId,
    Year,
    Months,
    UpdatedAt,
}
