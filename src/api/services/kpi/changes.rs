use actix_web::{Responder, web};

use crate::services::{KpiService, RequestContext};

use super::helpers::api_result;
use super::types::PatchRequest;

/// PATCH /changes
///
/// 部分成功：无效条目在 `rejected` 中逐条返回，其余照常保存
pub async fn apply_changes(
    ctx: RequestContext,
    body: web::Json<PatchRequest>,
    service: web::Data<KpiService>,
) -> impl Responder {
    api_result(service.apply_patch(&ctx, &body.changes).await)
}
