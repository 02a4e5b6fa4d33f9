use crate::cache::object_cache::register_builtin_plugins;
use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::clients::{create_content_client, create_roster_client};
use crate::config::AppConfig;
use crate::engine::{Collaborators, ReportSettings};
use crate::errors::{ReportError, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub collaborators: Collaborators,
}

/// 按名称创建缓存后端
async fn try_cache_backend(name: &str) -> Result<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name).ok_or_else(|| {
        ReportError::cache_plugin_not_found(format!("Cache backend '{name}' not found in registry"))
    })?;
    Ok(Arc::from(constructor().await?))
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    warn!("Attempting to create {} cache backend", cache_type);

    match try_cache_backend(cache_type).await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", cache_type);
            Ok(cache)
        }
        Err(e) if cache_type != "moka" => {
            warn!("Failed to create {} cache: {}", cache_type, e);
            warn!("Falling back to memory cache");
            let cache = try_cache_backend("moka").await?;
            warn!("Successfully created fallback Moka (in-memory) cache backend");
            Ok(cache)
        }
        Err(e) => Err(e),
    }
}

/// 准备服务器启动的上下文
/// 包括存储、外部服务客户端和缓存
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    register_builtin_plugins();
    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let config = AppConfig::get();

    let stores = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    let content = create_content_client(&config.content_service)
        .expect("Failed to create content service client");
    let roster = create_roster_client(&config.roster_service)
        .expect("Failed to create roster service client");
    info!(
        "Upstream clients ready: content={}, roster={}",
        config.content_service.base_url, config.roster_service.base_url
    );

    // 创建缓存实例
    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    let settings = ReportSettings::from(&config.report);
    debug!("Report settings: {:?}", settings);

    StartupContext {
        collaborators: Collaborators {
            tasks: stores.tasks,
            assigns: stores.assigns,
            stats: stores.stats,
            behaviors: stores.behaviors,
            content,
            roster,
            cache,
            settings,
        },
    }
}
