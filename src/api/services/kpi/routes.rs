//! KPI API 路由配置

use actix_web::web;

use super::activity::{get_month, save_month};
use super::changes::apply_changes;
use super::channels::list_channels;
use super::helpers::{json_config, path_config, query_config};
use super::monthly::get_year;

/// 请求体大小上限
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// `/v1/kpi` 路由
///
/// - GET/PUT /months/{year}/{month}
/// - PATCH /changes
/// - GET /years/{year}
/// - GET /channels
pub fn kpi_v1_routes() -> actix_web::Scope {
    web::scope("/v1/kpi")
        .app_data(json_config(MAX_BODY_BYTES))
        .app_data(path_config())
        .app_data(query_config())
        .route("/months/{year}/{month}", web::get().to(get_month))
        .route("/months/{year}/{month}", web::put().to(save_month))
        .route("/changes", web::patch().to(apply_changes))
        .route("/years/{year}", web::get().to(get_year))
        .route("/channels", web::get().to(list_channels))
}
