//! Mock implementations for testing.
//!
//! These mocks are used by the integration tests and are available to
//! downstream crates for testing their own pipeline wiring.

mod memory_record_store;
mod mock_aging;
mod mock_storage;

pub use memory_record_store::MemoryRecordStore;
pub use mock_aging::{MockAgingApi, RecordedCreate};
pub use mock_storage::{MockBlobStore, RecordedUpload};
