use std::fmt;

#[derive(Debug, Clone)]
pub enum KpiError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    Unauthorized(String),
    NotFound(String),
    Serialization(String),
    DateParse(String),
    Configuration(String),
}

impl KpiError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            KpiError::DatabaseConfig(_) => "E001",
            KpiError::DatabaseConnection(_) => "E002",
            KpiError::DatabaseOperation(_) => "E003",
            KpiError::FileOperation(_) => "E004",
            KpiError::Validation(_) => "E005",
            KpiError::Unauthorized(_) => "E006",
            KpiError::NotFound(_) => "E007",
            KpiError::Serialization(_) => "E008",
            KpiError::DateParse(_) => "E009",
            KpiError::Configuration(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            KpiError::DatabaseConfig(_) => "Database Configuration Error",
            KpiError::DatabaseConnection(_) => "Database Connection Error",
            KpiError::DatabaseOperation(_) => "Database Operation Error",
            KpiError::FileOperation(_) => "File Operation Error",
            KpiError::Validation(_) => "Validation Error",
            KpiError::Unauthorized(_) => "Unauthorized",
            KpiError::NotFound(_) => "Resource Not Found",
            KpiError::Serialization(_) => "Serialization Error",
            KpiError::DateParse(_) => "Date Parse Error",
            KpiError::Configuration(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            KpiError::DatabaseConfig(msg)
            | KpiError::DatabaseConnection(msg)
            | KpiError::DatabaseOperation(msg)
            | KpiError::FileOperation(msg)
            | KpiError::Validation(msg)
            | KpiError::Unauthorized(msg)
            | KpiError::NotFound(msg)
            | KpiError::Serialization(msg)
            | KpiError::DateParse(msg)
            | KpiError::Configuration(msg) => msg,
        }
    }

    /// 对应的 HTTP 状态码
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            KpiError::Validation(_) | KpiError::DateParse(_) | KpiError::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            KpiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            KpiError::NotFound(_) => StatusCode::NOT_FOUND,
            KpiError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            KpiError::DatabaseConfig(_)
            | KpiError::DatabaseOperation(_)
            | KpiError::FileOperation(_)
            | KpiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for KpiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for KpiError {}

// 便捷的构造函数
impl KpiError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        KpiError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        KpiError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        KpiError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        KpiError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        KpiError::Validation(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        KpiError::Unauthorized(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        KpiError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        KpiError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        KpiError::DateParse(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        KpiError::Configuration(msg.into())
    }
}

impl From<sea_orm::DbErr> for KpiError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => {
                KpiError::DatabaseConnection(err.to_string())
            }
            _ => KpiError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<std::io::Error> for KpiError {
    fn from(err: std::io::Error) -> Self {
        KpiError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for KpiError {
    fn from(err: serde_json::Error) -> Self {
        KpiError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for KpiError {
    fn from(err: chrono::ParseError) -> Self {
        KpiError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KpiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_codes_are_unique() {
        let all = [
            KpiError::database_config("x"),
            KpiError::database_connection("x"),
            KpiError::database_operation("x"),
            KpiError::file_operation("x"),
            KpiError::validation("x"),
            KpiError::unauthorized("x"),
            KpiError::not_found("x"),
            KpiError::serialization("x"),
            KpiError::date_parse("x"),
            KpiError::configuration("x"),
        ];
        let mut codes: Vec<_> = all.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            KpiError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            KpiError::unauthorized("no user").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            KpiError::not_found("channel").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            KpiError::database_operation("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = KpiError::validation("value must be >= 0");
        assert_eq!(err.format_simple(), "Validation Error: value must be >= 0");
        assert_eq!(err.to_string(), err.format_simple());
    }

    #[test]
    fn test_from_chrono_parse_error() {
        let parse_err = chrono::NaiveDate::parse_from_str("2026-13-01", "%Y-%m-%d").unwrap_err();
        let err: KpiError = parse_err.into();
        assert!(matches!(err, KpiError::DateParse(_)));
    }
}
