use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{error, info};

use super::model::{LogisticRiskModel, ModelError, RiskClassifier};

type Loader = Box<dyn Fn() -> Result<Arc<dyn RiskClassifier>, ModelError> + Send + Sync>;

/// Lazily loaded, read-only classifier cache.
///
/// The first successful [`ModelHandle::get`] loads the artifact while holding
/// a lock; concurrent callers wait on that lock and then find the cached
/// model. Once populated, reads take no lock. A failed load is not cached,
/// so the next call tries again.
pub struct ModelHandle {
    source: String,
    loader: Loader,
    cached: OnceLock<Arc<dyn RiskClassifier>>,
    load_lock: Mutex<()>,
}

impl ModelHandle {
    /// Handle backed by a JSON artifact on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let source = path.display().to_string();
        Self::with_loader(source, move || {
            let model = LogisticRiskModel::from_path(&path)?;
            Ok(Arc::new(model) as Arc<dyn RiskClassifier>)
        })
    }

    pub fn with_loader<F>(source: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn RiskClassifier>, ModelError> + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            loader: Box::new(loader),
            cached: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    /// Handle around an already constructed classifier.
    pub fn preloaded(model: Arc<dyn RiskClassifier>) -> Self {
        let handle = Self::with_loader("in-memory", {
            let model = Arc::clone(&model);
            move || Ok(Arc::clone(&model))
        });
        let _ = handle.cached.set(model);
        handle
    }

    pub fn get(&self) -> Result<Arc<dyn RiskClassifier>, ModelError> {
        if let Some(model) = self.cached.get() {
            return Ok(Arc::clone(model));
        }

        let _guard = self
            .load_lock
            .lock()
            .map_err(|_| ModelError::LockPoisoned)?;
        if let Some(model) = self.cached.get() {
            return Ok(Arc::clone(model));
        }

        info!(source = %self.source, "loading risk model");
        let model = (self.loader)().map_err(|err| {
            error!(source = %self.source, error = %err, "risk model load failed");
            err
        })?;
        info!(
            source = %self.source,
            features = model.feature_names().len(),
            version = model.model_version().unwrap_or("unversioned"),
            "risk model loaded and cached"
        );

        let _ = self.cached.set(Arc::clone(&model));
        Ok(model)
    }

    /// Load eagerly, e.g. at startup to avoid first-request latency.
    pub fn preload(&self) -> Result<(), ModelError> {
        self.get().map(|_| ())
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.get().is_some()
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("source", &self.source)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
