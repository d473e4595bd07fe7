use actix_web::{Responder, web};

use crate::metrics::ChannelScope;
use crate::services::{KpiService, RequestContext};

use super::helpers::{api_result, scope_or};
use super::types::ScopeQuery;

/// GET /channels?scope=all|active
pub async fn list_channels(
    ctx: RequestContext,
    query: web::Query<ScopeQuery>,
    service: web::Data<KpiService>,
) -> impl Responder {
    let scope = scope_or(query.scope, ChannelScope::AllKnown);
    api_result(service.list_channels(&ctx, scope).await)
}
