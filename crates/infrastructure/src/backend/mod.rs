//! REST backend for history and collections.

mod record_store;

pub use record_store::BackendRecordStore;
