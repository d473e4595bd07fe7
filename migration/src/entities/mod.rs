pub mod kpi_active_months;
pub mod kpi_channel;
pub mod kpi_channel_daily;
pub mod kpi_pipeline_daily;

pub use kpi_active_months::Entity as KpiActiveMonthsEntity;
pub use kpi_channel::Entity as KpiChannelEntity;
pub use kpi_channel_daily::Entity as KpiChannelDailyEntity;
pub use kpi_pipeline_daily::Entity as KpiPipelineDailyEntity;
