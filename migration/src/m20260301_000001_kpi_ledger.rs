//! KPI 账本基础表
//!
//! - kpi_channels: 用户自定义线索渠道
//! - kpi_pipeline_daily: 每用户每天一行的销售漏斗数据
//! - kpi_channel_daily: 每用户每渠道每天一行的线索数

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 渠道表
        manager
            .create_table(
                Table::create()
                    .table(KpiChannels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KpiChannels::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(KpiChannels::UserId).big_integer().not_null())
                    .col(ColumnDef::new(KpiChannels::Name).string_len(191).not_null())
                    .col(
                        ColumnDef::new(KpiChannels::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(KpiChannels::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiChannels::CreatedAt)
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
                    .name("idx_kpi_channels_user")
                    .table(KpiChannels::Table)
                    .col(KpiChannels::UserId)
                    .to_owned(),
            )
            .await?;

        // 2. 漏斗日数据表，金额以分存储
        manager
            .create_table(
                Table::create()
                    .table(KpiPipelineDaily::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KpiPipelineDaily::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(KpiPipelineDaily::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(KpiPipelineDaily::KpiDate).date().not_null())
                    .col(
                        ColumnDef::new(KpiPipelineDaily::Calls)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiPipelineDaily::Appointments)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiPipelineDaily::Quotes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiPipelineDaily::QuoteValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiPipelineDaily::Sales)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiPipelineDaily::SalesValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiPipelineDaily::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一索引：user_id + kpi_date
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_kpi_pipeline_user_date")
                    .table(KpiPipelineDaily::Table)
                    .col(KpiPipelineDaily::UserId)
                    .col(KpiPipelineDaily::KpiDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 3. 渠道线索日数据表
        manager
            .create_table(
                Table::create()
                    .table(KpiChannelDaily::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KpiChannelDaily::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(KpiChannelDaily::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(KpiChannelDaily::ChannelId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(KpiChannelDaily::KpiDate).date().not_null())
                    .col(
                        ColumnDef::new(KpiChannelDaily::Value)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiChannelDaily::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一索引：user_id + channel_id + kpi_date
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_kpi_channel_user_channel_date")
                    .table(KpiChannelDaily::Table)
                    .col(KpiChannelDaily::UserId)
                    .col(KpiChannelDaily::ChannelId)
                    .col(KpiChannelDaily::KpiDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 索引：user_id + kpi_date（按月范围查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_kpi_channel_user_date")
                    .table(KpiChannelDaily::Table)
                    .col(KpiChannelDaily::UserId)
                    .col(KpiChannelDaily::KpiDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_kpi_channel_user_date").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_kpi_channel_user_channel_date")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(KpiChannelDaily::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_kpi_pipeline_user_date").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(KpiPipelineDaily::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_kpi_channels_user").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(KpiChannels::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum KpiChannels {
    #[sea_orm(iden = "kpi_channels")]
    Table,
    Id,
    UserId,
    Name,
    IsActive,
    SortOrder,
    CreatedAt,
}

#[derive(DeriveIden)]
enum KpiPipelineDaily {
    #[sea_orm(iden = "kpi_pipeline_daily")]
    Table,
    Id,
    UserId,
    KpiDate,
    Calls,
    Appointments,
    Quotes,
    QuoteValueCents,
    Sales,
    SalesValueCents,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum KpiChannelDaily {
    #[sea_orm(iden = "kpi_channel_daily")]
    Table,
    Id,
    UserId,
    ChannelId,
    KpiDate,
    Value,
    UpdatedAt,
}
