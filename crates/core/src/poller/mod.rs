//! Background job polling.
//!
//! One poller task per job drives it from `processing` to a terminal
//! state: poll on an interval, retry transient transport failures against
//! a small budget, give up at the global deadline. Terminal handling is
//! persist, then emit, in that order, exactly once per job.

mod config;
mod runner;
mod types;

pub use config::PollerConfig;
pub use runner::{JobPoller, StatusMap};
pub use types::PollerError;
