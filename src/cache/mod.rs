//! 对象缓存层
//!
//! 以字符串为值的键值缓存抽象，后端以插件形式注册（moka / redis）。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

impl dyn ObjectCache {
    /// 读取并反序列化，解析失败的条目会被移除
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get_raw(key).await {
            CacheResult::Found(raw) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Failed to deserialize cache entry {}: {}", key, e);
                    self.remove(key).await;
                    None
                }
            },
            _ => None,
        }
    }

    /// 序列化后写入
    pub async fn insert_json<T: Serialize>(&self, key: &str, value: &T, ttl: u64) {
        match serde_json::to_string(value) {
            Ok(raw) => self.insert_raw(key.to_string(), raw, ttl).await,
            Err(e) => tracing::warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }
}

/// 声明缓存插件
///
/// 生成 `register()` 函数，在启动时把构造器登记到插件表中。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $ty:ty) => {
        pub fn register() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        let cache = <$ty>::new()
                            .map_err($crate::errors::ProjectFlowError::cache_connection)?;
                        let boxed: Box<dyn $crate::cache::ObjectCache> = Box::new(cache);
                        Ok::<_, $crate::errors::ProjectFlowError>(boxed)
                    }) as $crate::cache::register::BoxedObjectCacheFuture
                }),
            );
        }
    };
}
