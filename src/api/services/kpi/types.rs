//! KPI API 请求/响应类型

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::aggregation::EditChange;
use crate::metrics::{ChannelScope, TS_EXPORT_PATH};

/// 统一响应包装
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

/// `?scope=all|active`
#[derive(Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ScopeQuery {
    pub scope: Option<ChannelScope>,
}

/// PATCH /changes 请求体
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PatchRequest {
    pub changes: Vec<EditChange>,
}

/// PUT /months/{year}/{month} 请求体：日期 → 指标键 → 值
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct SaveMonthRequest {
    #[ts(type = "Record<string, Record<string, number | string | null>>")]
    pub days: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

/// 路径参数 `{year}/{month}`
#[derive(Deserialize, Clone, Copy, Debug)]
pub struct MonthPath {
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct YearPath {
    pub year: i32,
}
