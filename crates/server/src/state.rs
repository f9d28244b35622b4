use std::sync::Arc;

use prometheus::Registry;
use retrato_core::{AgingPipeline, Config, RecordStore, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<AgingPipeline>,
    records: Arc<dyn RecordStore>,
    registry: Registry,
}

impl AppState {
    pub fn new(
        config: Config,
        pipeline: Arc<AgingPipeline>,
        records: Arc<dyn RecordStore>,
        registry: Registry,
    ) -> Self {
        Self {
            config,
            pipeline,
            records,
            registry,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> &AgingPipeline {
        &self.pipeline
    }

    pub fn records(&self) -> &dyn RecordStore {
        self.records.as_ref()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
