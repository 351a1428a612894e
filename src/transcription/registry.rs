//! # Model Registry
//!
//! Owns the set of loadable language models, lazily loads them on first
//! demand, and keeps every loaded model resident for the rest of the
//! process. The cache is the only state shared across concurrent requests.
//!
//! ## Concurrency:
//! One lock per language, held across the load. Concurrent `resolve` calls
//! for the same uncached language serialize on that lock, so at most one
//! load per language is ever in flight and every waiter receives the handle
//! the winner cached. Loads for different languages do not contend.
//!
//! ## Availability vs. cache:
//! `is_available` and `list_available` are pure functions of filesystem
//! presence at call time. A model can be available before it was ever
//! loaded, and a cached model stays cached even if its files disappear.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::TranscriptionError;
use crate::transcription::language::LanguageCode;
use crate::transcription::model::{ModelDescriptor, SpeechEngine, SpeechModel};

type ModelSlot = Mutex<Option<Arc<dyn SpeechModel>>>;

pub struct ModelRegistry {
    engine: Arc<dyn SpeechEngine>,
    descriptors: BTreeMap<LanguageCode, ModelDescriptor>,
    /// One slot per enumerated language, created up front so the map itself
    /// never needs a lock.
    cache: BTreeMap<LanguageCode, ModelSlot>,
}

impl ModelRegistry {
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        descriptors: BTreeMap<LanguageCode, ModelDescriptor>,
    ) -> Self {
        let cache = descriptors
            .keys()
            .map(|&language| (language, Mutex::new(None)))
            .collect();
        Self {
            engine,
            descriptors,
            cache,
        }
    }

    /// Resolve a concrete language to its loaded model, loading and caching
    /// it on first demand.
    ///
    /// ## Errors:
    /// [`TranscriptionError::ModelNotFound`] when the configured location
    /// does not exist on disk, independent of cache state for other
    /// languages.
    pub fn resolve(&self, language: LanguageCode) -> Result<Arc<dyn SpeechModel>, TranscriptionError> {
        let descriptor = self.descriptors.get(&language).ok_or_else(|| {
            TranscriptionError::ModelNotFound(format!("no model configured for {}", language))
        })?;

        let slot = self
            .cache
            .get(&language)
            .expect("cache has a slot for every descriptor");
        let mut guard = slot
            .lock()
            .map_err(|_| TranscriptionError::Recognition("model cache lock poisoned".to_string()))?;

        if let Some(model) = guard.as_ref() {
            return Ok(Arc::clone(model));
        }

        if !descriptor.is_available() {
            return Err(TranscriptionError::ModelNotFound(format!(
                "model for {} not found at {}",
                language,
                descriptor.path.display()
            )));
        }

        let model = self.engine.load_model(descriptor)?;
        tracing::info!("Model for {} loaded and cached", language);
        *guard = Some(Arc::clone(&model));
        Ok(model)
    }

    /// Whether a model for `language` is present on disk right now.
    pub fn is_available(&self, language: LanguageCode) -> bool {
        self.descriptors
            .get(&language)
            .map(|d| d.is_available())
            .unwrap_or(false)
    }

    /// Languages whose models are present on disk, code → display name.
    pub fn list_available(&self) -> BTreeMap<LanguageCode, &'static str> {
        self.descriptors
            .iter()
            .filter(|(_, d)| d.is_available())
            .map(|(&language, d)| (language, d.display_name))
            .collect()
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::model::model_catalog;
    use crate::transcription::testing::StubEngine;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn registry_with_models(
        langs: &[LanguageCode],
        engine: Arc<StubEngine>,
    ) -> (tempfile::TempDir, ModelRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let catalog = model_catalog(dir.path());
        for lang in langs {
            std::fs::create_dir(&catalog[lang].path).unwrap();
        }
        let registry = ModelRegistry::new(engine, catalog);
        (dir, registry)
    }

    #[test]
    fn test_resolve_missing_model_is_not_found() {
        let engine = Arc::new(StubEngine::silent());
        let (_dir, registry) = registry_with_models(&[], engine.clone());

        let err = registry.resolve(LanguageCode::En).err().unwrap();
        assert!(matches!(err, TranscriptionError::ModelNotFound(_)));
        assert_eq!(engine.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resolve_caches_after_first_load() {
        let engine = Arc::new(StubEngine::silent());
        let (_dir, registry) = registry_with_models(&[LanguageCode::En], engine.clone());

        registry.resolve(LanguageCode::En).unwrap();
        registry.resolve(LanguageCode::En).unwrap();
        assert_eq!(engine.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_availability_is_filesystem_not_cache() {
        let engine = Arc::new(StubEngine::silent());
        let (_dir, registry) =
            registry_with_models(&[LanguageCode::En, LanguageCode::Kz], engine);

        // Available before any load ever happened
        assert!(registry.is_available(LanguageCode::En));
        assert!(registry.is_available(LanguageCode::Kz));
        assert!(!registry.is_available(LanguageCode::Ru));

        let available = registry.list_available();
        assert_eq!(available.len(), 2);
        assert_eq!(available[&LanguageCode::En], "English");
    }

    #[test]
    fn test_concurrent_resolve_loads_once() {
        let engine = Arc::new(StubEngine::silent().with_load_delay(Duration::from_millis(50)));
        let (_dir, registry) = registry_with_models(&[LanguageCode::En], engine.clone());
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.resolve(LanguageCode::En).map(|_| ()))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(engine.loads.load(Ordering::SeqCst), 1);
    }
}
