use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use super::backend::ZeroShotBackend;
use crate::error::Result;

// Entries are strong references: a backend, once initialised, lives until
// process exit. The lock is held across `loader` so each key loads once.
type CacheStorage = HashMap<String, Arc<dyn ZeroShotBackend>>;

pub struct ModelCache {
    cache: Mutex<CacheStorage>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_create<F>(&self, key: &str, loader: F) -> Result<Arc<dyn ZeroShotBackend>>
    where
        F: FnOnce() -> Result<Arc<dyn ZeroShotBackend>>,
    {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(backend) = cache.get(key) {
            return Ok(Arc::clone(backend));
        }

        log::info!("Initialising classifier backend {key}");
        let backend = loader()?;
        cache.insert(key.to_string(), Arc::clone(&backend));
        Ok(backend)
    }

    pub fn contains(&self, key: &str) -> bool {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.contains_key(key)
    }

    pub fn len(&self) -> usize {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.len()
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

static GLOBAL_MODEL_CACHE: Lazy<Arc<ModelCache>> = Lazy::new(|| Arc::new(ModelCache::new()));

/// Process-wide cache shared by every classifier built without an explicit one.
pub fn global_cache() -> Arc<ModelCache> {
    Arc::clone(&GLOBAL_MODEL_CACHE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Constant(f32);

    impl ZeroShotBackend for Constant {
        fn score(&self, _text: &str, labels: &[String]) -> Result<Vec<(String, f32)>> {
            Ok(labels.iter().map(|l| (l.clone(), self.0)).collect())
        }
    }

    #[test]
    fn loader_runs_once_per_key() {
        let cache = ModelCache::new();
        let loads = AtomicUsize::new(0);
        for _ in 0..3 {
            cache
                .get_or_create("sentiment", || {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(Constant(0.5)))
                })
                .unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_keys_are_independent() {
        let cache = ModelCache::new();
        let a = cache
            .get_or_create("sentiment", || Ok(Arc::new(Constant(0.1))))
            .unwrap();
        let b = cache
            .get_or_create("emotion", || Ok(Arc::new(Constant(0.9))))
            .unwrap();
        let labels = vec!["x".to_string()];
        assert_eq!(a.score("t", &labels).unwrap()[0].1, 0.1);
        assert_eq!(b.score("t", &labels).unwrap()[0].1, 0.9);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache = ModelCache::new();
        let err = cache.get_or_create("sentiment", || {
            Err(DashboardError::ExternalCapability("offline".into()))
        });
        assert!(err.is_err());
        assert!(!cache.contains("sentiment"));
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_first_use_loads_once() {
        let cache = Arc::new(ModelCache::new());
        let loads = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let loads = Arc::clone(&loads);
                std::thread::spawn(move || {
                    cache
                        .get_or_create("emotion", || {
                            loads.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(10));
                            Ok(Arc::new(Constant(0.2)))
                        })
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
