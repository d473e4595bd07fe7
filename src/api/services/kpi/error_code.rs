//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use crate::errors::KpiError;
use crate::metrics::TS_EXPORT_PATH;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 身份错误
/// - 3000-3099: 台账错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,
    InvalidPayload = 1013,
    ServiceUnavailable = 1030,

    // 身份错误 2000-2099
    MissingUserContext = 2000,

    // 台账错误 3000-3099
    LedgerError = 3000,
    ChannelNotFound = 3001,
}

impl From<&KpiError> for ErrorCode {
    fn from(err: &KpiError) -> Self {
        match err {
            KpiError::Validation(_) => ErrorCode::BadRequest,
            KpiError::DateParse(_) => ErrorCode::InvalidDateFormat,
            KpiError::Serialization(_) => ErrorCode::InvalidPayload,
            KpiError::Unauthorized(_) => ErrorCode::MissingUserContext,
            KpiError::NotFound(_) => ErrorCode::ChannelNotFound,
            KpiError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            KpiError::DatabaseOperation(_) => ErrorCode::LedgerError,
            KpiError::DatabaseConfig(_)
            | KpiError::FileOperation(_)
            | KpiError::Configuration(_) => ErrorCode::InternalServerError,
        }
    }
}
