//! 年度月表（12 个月 + YTD + 月均）

use actix_web::{Responder, web};

use crate::metrics::ChannelScope;
use crate::services::{KpiService, RequestContext};

use super::helpers::{api_result, scope_or};
use super::types::{ScopeQuery, YearPath};

/// GET /years/{year}
///
/// 默认统计所有渠道（包括已停用的），历史数据不因停用而变化
pub async fn get_year(
    ctx: RequestContext,
    path: web::Path<YearPath>,
    query: web::Query<ScopeQuery>,
    service: web::Data<KpiService>,
) -> impl Responder {
    let scope = scope_or(query.scope, ChannelScope::AllKnown);
    api_result(service.get_year(&ctx, path.year, scope).await)
}
