use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::ObjectCache;
use crate::cache::register::{
    debug_object_cache_registry, get_object_cache_plugin, register_builtin_object_caches,
};
use crate::config::AppConfig;
use crate::engine::{EngineSettings, ScoringEngine};
use crate::errors::{ProjectFlowError, Result};
use crate::integrations::{
    FileContentExtractor, IdentityVerifier, LogNotifier, create_scorer,
};
use crate::utils::jwt::JwtIdentityVerifier;

const FALLBACK_CACHE: &str = "moka";

pub struct StartupContext {
    pub engine: Arc<ScoringEngine>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

/// 按名称构造缓存后端
async fn build_cache(name: &str) -> Result<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name).ok_or_else(|| {
        ProjectFlowError::cache_plugin_not_found(format!("Cache backend '{name}' not registered"))
    })?;
    let cache = constructor().await?;
    Ok(Arc::from(cache))
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = &AppConfig::get().cache.cache_type;
    warn!("Attempting to create {} cache backend", cache_type);

    match build_cache(cache_type).await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", cache_type);
            Ok(cache)
        }
        Err(e) if cache_type != FALLBACK_CACHE => {
            warn!(
                "Failed to create {} cache: {}. Falling back to memory cache",
                cache_type, e
            );
            build_cache(FALLBACK_CACHE).await
        }
        Err(e) => Err(e),
    }
}

/// 准备服务器启动的上下文
///
/// 依次初始化存储（含迁移）、缓存、评分后端和身份校验，组装成评分引擎。
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = AppConfig::get();

    register_builtin_object_caches();
    if cfg!(debug_assertions) {
        debug_object_cache_registry();
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    let scorer = create_scorer(&config.scoring)?;
    warn!("Automated scorer backend: {}", scorer.name());

    if config.jwt.secret.is_empty() {
        warn!("jwt.secret is empty, every bearer token will be rejected");
    }
    let verifier: Arc<dyn IdentityVerifier> =
        Arc::new(JwtIdentityVerifier::from_config(&config.jwt));

    let settings = EngineSettings::from_config(config);
    debug!("Engine settings: {:?}", settings);

    let engine = ScoringEngine::new(storage, scorer, cache, settings)
        .with_notifier(Arc::new(LogNotifier::from_config(&config.notification)))
        .with_extractor(Arc::new(FileContentExtractor::new(&config.upload.dir)));

    Ok(StartupContext {
        engine: Arc::new(engine),
        verifier,
    })
}
