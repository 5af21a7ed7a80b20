// Repository module structure
pub mod errors;
mod in_memory;
mod key_value;
#[cfg(feature = "sqlite")]
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use in_memory::InMemoryStorage;
pub use key_value::{DomainStore, KeyValueStore};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStorage;
