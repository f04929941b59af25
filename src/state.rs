//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::LimitsConfig;
use crate::db::BrandStore;
use crate::extract::TextExtractor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn BrandStore>,
    extractor: Arc<dyn TextExtractor>,
    limits: LimitsConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BrandStore>,
        extractor: Arc<dyn TextExtractor>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                extractor,
                limits,
            }),
        }
    }

    /// Get the brand store
    pub fn store(&self) -> &dyn BrandStore {
        self.inner.store.as_ref()
    }

    /// Get the PDF text extractor
    pub fn extractor(&self) -> &dyn TextExtractor {
        self.inner.extractor.as_ref()
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.inner.limits
    }

    /// Deadline for a single store call
    pub fn db_timeout(&self) -> Duration {
        self.inner.limits.db_timeout
    }

    /// Deadline for extraction plus upsert
    pub fn upload_timeout(&self) -> Duration {
        self.inner.limits.upload_timeout
    }
}
