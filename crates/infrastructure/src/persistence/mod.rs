//! Persistence implementations for file-based storage.

mod file_key_value;
mod file_record_store;

pub use file_key_value::FileKeyValueStore;
pub use file_record_store::FileRecordStore;
