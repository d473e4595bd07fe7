//! 从上游认证层写入的请求头中提取当前用户

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use super::request_id::RequestId;
use crate::errors::KpiError;
use crate::services::RequestContext;

/// 携带用户 ID 的请求头名（来自 `[api].user_header`）
#[derive(Clone, Debug)]
pub struct UserHeader(pub String);

impl Default for UserHeader {
    fn default() -> Self {
        Self(crate::config::get_config().api.user_header.clone())
    }
}

impl FromRequest for RequestContext {
    type Error = KpiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = req
            .app_data::<web::Data<UserHeader>>()
            .map(|h| h.0.clone())
            .unwrap_or_else(|| UserHeader::default().0);

        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();

        let raw = req.headers().get(header.as_str()).and_then(|v| v.to_str().ok());
        let result = RequestContext::from_header(raw, request_id);
        if let Err(ref e) = result {
            debug!("Rejected request without valid {}: {}", header, e);
        }
        ready(result)
    }
}
