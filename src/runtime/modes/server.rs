//! Server mode
//!
//! Builds the actix-web application and runs it until Ctrl+C / SIGTERM.

use std::sync::Arc;

use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpResponse, HttpServer, web};
use anyhow::Result;
use tracing::warn;

use crate::api::middleware::{RequestIdMiddleware, UserHeader};
use crate::api::services::kpi::{ErrorCode, error_response};
use crate::api::services::{AppStartTime, health_routes, kpi_v1_routes};
use crate::config::StaticConfig;
use crate::runtime::lifetime;
use crate::runtime::lifetime::startup::RouteConfig;
use crate::services::KpiService;
use crate::storage::LedgerStore;

/// 注册共享状态与全部路由
///
/// 服务器与集成测试共用，保证两边的 App 结构一致。
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    storage: Arc<dyn LedgerStore>,
    service: Arc<KpiService>,
    route: &RouteConfig,
    app_start_time: AppStartTime,
) {
    cfg.app_data(web::Data::new(storage))
        .app_data(web::Data::from(service))
        .app_data(web::Data::new(app_start_time))
        .app_data(web::Data::new(UserHeader(route.user_header.clone())))
        .service(health_routes())
        .service(web::scope(&route.api_prefix).service(kpi_v1_routes()))
        .default_service(web::to(not_found));
}

async fn not_found() -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::NOT_FOUND,
        ErrorCode::NotFound,
        "Not Found",
    )
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_startup(config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let storage = startup.storage.clone();
    let service = startup.service.clone();
    let route = RouteConfig::from_config(config);

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);
    warn!(
        "KPI API mounted at {}/v1/kpi, user identity from header {}",
        route.api_prefix, route.user_header
    );

    let server = HttpServer::new(move || {
        let storage = storage.clone();
        let service = service.clone();
        let route = route.clone();
        let app_start_time = app_start_time.clone();

        App::new()
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            // 最外层，保证所有响应都带 request id
            .wrap(RequestIdMiddleware)
            .configure(move |cfg| configure_app(cfg, storage, service, &route, app_start_time))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(bind_address)?.run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&startup.db) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
