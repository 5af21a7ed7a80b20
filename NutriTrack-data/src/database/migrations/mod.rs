// Schema migrations for the local store
mod sqlite;

pub use sqlite::run_migrations as run_sqlite_migrations;
