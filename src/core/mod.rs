//! Core configuration types: documents, snapshots and the reloadable store.

mod builder;
mod document;
mod loader;
pub mod path;
mod snapshot;
mod store;
mod value;

pub use builder::{ConfigStoreBuilder, DEFAULT_REFRESH_INTERVAL};
pub use document::Document;
pub(crate) use loader::FileLoader;
pub use snapshot::Snapshot;
pub use store::ConfigStore;
pub use value::{Map, Value};
