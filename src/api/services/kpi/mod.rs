//! KPI ledger HTTP API

mod activity;
mod changes;
mod channels;
pub mod error_code;
pub mod helpers;
mod monthly;
pub mod routes;
pub mod types;

pub use error_code::ErrorCode;
pub use helpers::{api_result, error_from_kpi, error_response, success_response};
pub use routes::kpi_v1_routes;
pub use types::{ApiResponse, PatchRequest, SaveMonthRequest, ScopeQuery};
