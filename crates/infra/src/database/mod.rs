//! Catalog store backends and their ephemeral providers

pub mod document;
pub mod postgres_store;
pub mod providers;
pub mod sqlite_store;

pub use document::{DocumentCatalogStore, DocumentDb};
pub use postgres_store::PostgresCatalogStore;
pub use providers::{
    acquire_store, provider_for, EphemeralDocumentProvider, EphemeralSqliteProvider,
    PostgresProvider,
};
pub use sqlite_store::SqliteCatalogStore;
