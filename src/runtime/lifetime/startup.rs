use std::sync::Arc;

use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::services::KpiService;
use crate::storage::{LedgerStore, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<dyn LedgerStore>,
    pub service: Arc<KpiService>,
    /// 关闭时用于释放连接池
    pub db: DatabaseConnection,
}

#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub api_prefix: String,
    pub user_header: String,
}

impl RouteConfig {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            api_prefix: normalize_prefix(&config.api.prefix),
            user_header: config.api.user_header.clone(),
        }
    }
}

/// 统一前缀格式：以 `/` 开头，不以 `/` 结尾；空串表示挂在根路径
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// 准备服务器与 CLI 共用的上下文：存储（含迁移）与 KPI 服务
pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create_with(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let db = storage.get_db().clone();
    let storage: Arc<dyn LedgerStore> = storage;
    let service = Arc::new(KpiService::new(storage.clone(), config));

    debug!("Pre-startup completed in {:?}", start_time.elapsed());

    Ok(StartupContext {
        storage,
        service,
        db,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/api"), "/api");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix(" /kpi/api/ "), "/kpi/api");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }
}
