pub mod moka;
pub mod redis;

use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::cache::register::register_object_cache_plugin;
use crate::errors::ReportError;

/// 注册内置的缓存后端
pub fn register_builtin_plugins() {
    register_object_cache_plugin(
        "moka",
        Arc::new(|| {
            Box::pin(async {
                let cache = self::moka::MokaCacheWrapper::new().map_err(ReportError::cache_connection)?;
                Ok(Box::new(cache) as Box<dyn ObjectCache>)
            })
        }),
    );
    register_object_cache_plugin(
        "redis",
        Arc::new(|| {
            Box::pin(async {
                let cache =
                    self::redis::RedisObjectCache::new().map_err(ReportError::cache_connection)?;
                Ok(Box::new(cache) as Box<dyn ObjectCache>)
            })
        }),
    );
}
