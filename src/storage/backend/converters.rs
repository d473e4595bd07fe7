use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::ActiveValue::{NotSet, Set};

use crate::metrics::{Channel, ChannelId, Money, PipelineField};
use crate::storage::models::{PipelinePatch, PipelineValues};
use migration::entities::{kpi_channel, kpi_channel_daily, kpi_pipeline_daily};

/// 将漏斗日数据 Model 转换为 PipelineValues
pub fn model_to_pipeline_values(model: &kpi_pipeline_daily::Model) -> PipelineValues {
    PipelineValues {
        calls: model.calls,
        appointments: model.appointments,
        quotes: model.quotes,
        quote_value: Money::from_cents(model.quote_value_cents),
        sales: model.sales,
        sales_value: Money::from_cents(model.sales_value_cents),
    }
}

/// 将渠道 Model 转换为 Channel
pub fn model_to_channel(model: kpi_channel::Model) -> Channel {
    Channel {
        id: ChannelId(model.id),
        name: model.name,
        is_active: model.is_active,
        sort_order: model.sort_order,
    }
}

/// 字段对应的数据库列
pub fn pipeline_column(field: PipelineField) -> kpi_pipeline_daily::Column {
    use kpi_pipeline_daily::Column;

    match field {
        PipelineField::Calls => Column::Calls,
        PipelineField::Appointments => Column::Appointments,
        PipelineField::Quotes => Column::Quotes,
        PipelineField::QuoteValue => Column::QuoteValueCents,
        PipelineField::Sales => Column::Sales,
        PipelineField::SalesValue => Column::SalesValueCents,
    }
}

/// 将部分字段写入转换为 ActiveModel（用于插入/冲突更新）
///
/// 缺失字段在首次插入时为 0，冲突更新时只覆盖 patch 中的列。
pub fn pipeline_patch_to_active_model(
    user_id: i64,
    date: NaiveDate,
    patch: &PipelinePatch,
    now: DateTime<Utc>,
) -> kpi_pipeline_daily::ActiveModel {
    let values = patch.to_values();

    kpi_pipeline_daily::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        kpi_date: Set(date),
        calls: Set(values.calls),
        appointments: Set(values.appointments),
        quotes: Set(values.quotes),
        quote_value_cents: Set(values.quote_value.cents()),
        sales: Set(values.sales),
        sales_value_cents: Set(values.sales_value.cents()),
        updated_at: Set(now),
    }
}

pub fn channel_value_to_active_model(
    user_id: i64,
    channel_id: ChannelId,
    date: NaiveDate,
    value: i64,
    now: DateTime<Utc>,
) -> kpi_channel_daily::ActiveModel {
    kpi_channel_daily::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        channel_id: Set(channel_id.0),
        kpi_date: Set(date),
        value: Set(value),
        updated_at: Set(now),
    }
}
