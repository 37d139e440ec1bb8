use crate::error::{PipelineError, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Identifies a loadable model configuration within the cache.
pub trait ModelOptions {
    /// Stable key for this configuration (e.g. `qwen3-0.6b`).
    fn cache_key(&self) -> String;
}

type CacheStorage = HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>;

/// Keeps loaded models alive for the lifetime of the process.
///
/// Models are read-only once loaded, so a single instance is shared by every pipeline built for
/// the same configuration and device.
pub struct ModelCache {
    cache: Mutex<CacheStorage>,
    // Serializes loads so two callers never load the same weights concurrently.
    loading: tokio::sync::Mutex<()>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            loading: tokio::sync::Mutex::new(()),
        }
    }

    fn lookup<M>(&self, cache_key: &(TypeId, String)) -> Result<Option<Arc<M>>>
    where
        M: Send + Sync + 'static,
    {
        let cache = self.lock()?;
        Ok(cache
            .get(cache_key)
            .cloned()
            .and_then(|entry| entry.downcast::<M>().ok()))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CacheStorage>> {
        self.cache
            .lock()
            .map_err(|_| PipelineError::Unexpected("Model cache lock poisoned".into()))
    }

    /// Return the cached model for `key`, running `loader` only if none is cached yet.
    pub async fn get_or_create_async<M, Fut, F>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<M>>,
    {
        let cache_key = (TypeId::of::<M>(), key.to_string());

        if let Some(model) = self.lookup::<M>(&cache_key)? {
            return Ok(model);
        }

        let _guard = self.loading.lock().await;
        // Another caller may have finished loading while we waited.
        if let Some(model) = self.lookup::<M>(&cache_key)? {
            return Ok(model);
        }

        tracing::debug!(key, "model cache miss");
        let model = Arc::new(loader().await?);
        self.lock()?
            .insert(cache_key, model.clone() as Arc<dyn Any + Send + Sync>);

        Ok(model)
    }

    /// Drop every cached model. Pipelines still holding a model keep it alive.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.lock() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: once_cell::sync::Lazy<ModelCache> =
    once_cell::sync::Lazy::new(ModelCache::new);

/// The process-wide model cache used by pipeline builders.
pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestModel {
        id: String,
    }

    #[tokio::test]
    async fn returns_same_instance() {
        let cache = ModelCache::new();
        let model1 = cache
            .get_or_create_async("test", || async {
                Ok(TestModel {
                    id: "original".into(),
                })
            })
            .await
            .unwrap();
        let model2 = cache
            .get_or_create_async("test", || async { Ok(TestModel { id: "new".into() }) })
            .await
            .unwrap();

        assert_eq!(model2.id, "original");
        assert!(Arc::ptr_eq(&model1, &model2));
    }

    #[tokio::test]
    async fn keeps_models_after_callers_drop() {
        let cache = ModelCache::new();
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let model = cache
                .get_or_create_async("k", || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(TestModel { id: "k".into() })
                })
                .await
                .unwrap();
            drop(model);
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let cache = ModelCache::new();
        let err = cache
            .get_or_create_async::<TestModel, _, _>("bad", || async {
                Err(PipelineError::Download("offline".into()))
            })
            .await;
        assert!(err.is_err());
        assert!(cache.is_empty());

        let model = cache
            .get_or_create_async("bad", || async { Ok(TestModel { id: "retry".into() }) })
            .await
            .unwrap();
        assert_eq!(model.id, "retry");
    }

    #[tokio::test]
    async fn different_keys_independent() {
        let cache = ModelCache::new();
        let first = cache
            .get_or_create_async("key1", || async { Ok(TestModel { id: "first".into() }) })
            .await
            .unwrap();
        let second = cache
            .get_or_create_async("key2", || async { Ok(TestModel { id: "second".into() }) })
            .await
            .unwrap();

        assert_eq!(first.id, "first");
        assert_eq!(second.id, "second");
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
