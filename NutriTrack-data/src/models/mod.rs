pub mod keys;

pub use keys::StorageKey;
