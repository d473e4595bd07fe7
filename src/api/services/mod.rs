mod health;
pub mod kpi;

pub use health::{AppStartTime, HealthService, health_routes};
pub use kpi::kpi_v1_routes;
