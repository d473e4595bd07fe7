//! 月度录入表：读取与整表保存

use actix_web::{Responder, web};
use tracing::trace;

use crate::metrics::ChannelScope;
use crate::services::{KpiService, RequestContext};

use super::helpers::{api_result, scope_or};
use super::types::{MonthPath, SaveMonthRequest, ScopeQuery};

/// GET /months/{year}/{month}
///
/// 默认只统计启用中的渠道（录入表视角）
pub async fn get_month(
    ctx: RequestContext,
    path: web::Path<MonthPath>,
    query: web::Query<ScopeQuery>,
    service: web::Data<KpiService>,
) -> impl Responder {
    let MonthPath { year, month } = path.into_inner();
    let scope = scope_or(query.scope, ChannelScope::ActiveOnly);
    trace!("get_month {}-{:02} scope={:?}", year, month, scope);

    api_result(service.get_month(&ctx, year, month, scope).await)
}

/// PUT /months/{year}/{month}
pub async fn save_month(
    ctx: RequestContext,
    path: web::Path<MonthPath>,
    body: web::Json<SaveMonthRequest>,
    service: web::Data<KpiService>,
) -> impl Responder {
    let MonthPath { year, month } = path.into_inner();
    api_result(service.save_month(&ctx, year, month, &body.days).await)
}
