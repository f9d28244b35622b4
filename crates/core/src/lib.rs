pub mod aging;
pub mod config;
pub mod events;
pub mod metrics;
pub mod pipeline;
pub mod poller;
pub mod record;
pub mod storage;
pub mod testing;

pub use aging::{AgingApi, AgingApiConfig, AgingError, AgingParams, HttpAgingClient, Job, JobState};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use events::{EventBus, PipelineEvent};
pub use pipeline::{AgingPipeline, PhotoUpload, SubmitReceipt, UploadConfig, UploadError};
pub use poller::{JobPoller, PollerConfig, PollerError};
pub use record::{
    ArtifactRecord, RecordError, RecordStore, SqliteRecordStore, StatusSync, TransformationUpdate,
    UpdateOutcome,
};
pub use storage::{BlobStore, FsBlobStore, StorageConfig, StorageError};
