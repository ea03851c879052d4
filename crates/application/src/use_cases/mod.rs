//! Application use cases (business logic orchestration).

mod environment_store;
mod history_recorder;

pub use environment_store::{CURRENT_ENVIRONMENT_KEY, ENVIRONMENTS_KEY, EnvironmentStore};
pub use history_recorder::HistoryRecorder;
