//! KPI API 帮助函数

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, error::JsonPayloadError, web};
use serde::Serialize;
use tracing::debug;

use crate::errors::KpiError;
use crate::metrics::ChannelScope;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 KpiError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_kpi(err: &KpiError) -> HttpResponse {
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<KpiError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_kpi(&e.into()),
    }
}

/// 提取器（身份、路径）失败时同样返回统一的 JSON 包装
impl ResponseError for KpiError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        error_from_kpi(self)
    }
}

/// 无法解析的请求体整体返回 400
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err: JsonPayloadError, req: &HttpRequest| {
            debug!("Invalid JSON payload on {}: {}", req.path(), err);
            KpiError::serialization(format!("invalid request body: {}", err)).into()
        })
}

/// 路径参数解析失败（例如 `/months/abc/1`）
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        KpiError::validation(format!("invalid path parameter: {}", err)).into()
    })
}

/// 查询参数解析失败（例如 `?scope=everything`）
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        KpiError::validation(format!("invalid query parameter: {}", err)).into()
    })
}

/// 未指定 scope 时使用的默认值
pub fn scope_or(scope: Option<ChannelScope>, default: ChannelScope) -> ChannelScope {
    scope.unwrap_or(default)
}
