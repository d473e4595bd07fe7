//! Request-scoped identity

use crate::errors::{KpiError, Result};

/// The acting user plus a correlation id, passed into every service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: i64,
    pub request_id: String,
}

impl RequestContext {
    pub fn new(user_id: i64, request_id: impl Into<String>) -> Result<Self> {
        if user_id <= 0 {
            return Err(KpiError::unauthorized(format!(
                "invalid user id: {}",
                user_id
            )));
        }
        Ok(Self {
            user_id,
            request_id: request_id.into(),
        })
    }

    /// Parse the raw header value set by the upstream auth layer
    pub fn from_header(raw: Option<&str>, request_id: impl Into<String>) -> Result<Self> {
        let raw = raw
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| KpiError::unauthorized("missing user identity"))?;
        let user_id = raw
            .parse::<i64>()
            .map_err(|_| KpiError::unauthorized(format!("invalid user id: {}", raw)))?;
        Self::new(user_id, request_id)
    }
}
