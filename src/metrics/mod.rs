//! KPI metric schema
//!
//! Two families of metrics are tracked per user and day:
//! - a fixed set of pipeline metrics (`PipelineField`)
//! - a user-defined, variable set of lead channels (`Channel`)
//!
//! Every cell of the editable grid is addressed by a `MetricKey`, which is
//! decided once when a payload is parsed.

mod channel;
mod key;
mod money;
mod pipeline;

pub use channel::{Channel, ChannelId, ChannelScope};
pub use key::MetricKey;
pub use money::Money;
pub use pipeline::{MetricKind, PipelineField};

/// TypeScript 类型输出路径（相对于 ts-rs 导出目录）
pub const TS_EXPORT_PATH: &str = "../dashboard/src/types/kpi.generated.ts";
