use crate::cache::{
    ObjectCache,
    register::{get_object_cache_plugin, registered_object_cache_plugins},
};
use crate::config::AppConfig;
use crate::storage::Storage;
use crate::storage::blob_store::{BlobStore, create_blob_store};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub blob_store: Arc<dyn BlobStore>,
}

type StartupResult<T> = Result<T, Box<dyn std::error::Error>>;

// 回退到内存缓存
async fn fallback_memory_cache() -> Option<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin("moka")?;
    match constructor().await {
        Ok(cache) => {
            warn!("Successfully created fallback Moka (in-memory) cache backend");
            Some(Arc::from(cache))
        }
        Err(e) => {
            warn!("Failed to create fallback Moka cache: {}", e);
            None
        }
    }
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache() -> StartupResult<Arc<dyn ObjectCache>> {
    let cache_type = &AppConfig::get().cache.cache_type;

    warn!("Attempting to create {} cache backend", cache_type);
    if cfg!(debug_assertions) {
        debug!(
            "Registered cache backends: {:?}",
            registered_object_cache_plugins()
        );
    }

    match get_object_cache_plugin(cache_type) {
        Some(constructor) => match constructor().await {
            Ok(cache) => {
                warn!("Successfully created {} cache backend", cache_type);
                return Ok(Arc::from(cache));
            }
            Err(e) => warn!("Failed to create {} cache: {}", cache_type, e),
        },
        None => warn!("Cache backend '{}' not found in registry", cache_type),
    }

    if cache_type != "moka" {
        warn!("Falling back to memory cache");
        if let Some(cache) = fallback_memory_cache().await {
            return Ok(cache);
        }
    }

    Err(format!("No cache backend available (tried: {cache_type})").into())
}

/// 准备服务器启动的上下文
/// 包括存储、缓存和文档存储
pub async fn prepare_server_startup() -> StartupResult<StartupContext> {
    // 已安装时返回 Err，忽略即可
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = AppConfig::get();
    if config.uses_default_jwt_secret() {
        warn!("JWT secret is the built-in default; set JWT_SECRET before deploying");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    let blob_store = create_blob_store();
    debug!("Document store rooted at {}", config.upload.dir);

    Ok(StartupContext {
        storage,
        cache,
        blob_store,
    })
}
