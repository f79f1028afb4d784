//! Providers that hand out one throwaway store per benchmark run.
//!
//! Embedded backends get a fresh temp directory (`cadence-store-*`) that is
//! removed on teardown. PostgreSQL gets a fresh schema on the configured
//! server that is dropped on teardown.

use std::fmt;
use std::path::{Path, PathBuf};

use cadence_core::{StoreLease, StoreProvider};
use cadence_domain::constants::EPHEMERAL_DIR_PREFIX;
use cadence_domain::{CadenceError, Result, StoreConfig, StoreKind};
use tempfile::TempDir;
use tracing::info;

use super::document::DocumentCatalogStore;
use super::postgres_store::PostgresCatalogStore;
use super::sqlite_store::SqliteCatalogStore;
use crate::errors::InfraError;

/// Fresh SQLite database in its own temp directory per lease.
#[derive(Debug, Clone, Default)]
pub struct EphemeralSqliteProvider {
    temp_root: Option<PathBuf>,
}

impl EphemeralSqliteProvider {
    /// Scratch directories in the system temp dir.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_temp_root(root: impl Into<PathBuf>) -> Self {
        Self { temp_root: Some(root.into()) }
    }

    /// Honour `temp_root` from `config`.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self { temp_root: config.temp_root.as_ref().map(PathBuf::from) }
    }
}

impl StoreProvider for EphemeralSqliteProvider {
    fn kind(&self) -> StoreKind {
        StoreKind::Sqlite
    }

    fn acquire(&self) -> Result<StoreLease> {
        let dir = scratch_dir(self.temp_root.as_deref())?;
        let label = dir.path().display().to_string();
        let store = SqliteCatalogStore::open_in(dir)?;

        info!(store = %label, kind = %StoreKind::Sqlite, "acquired ephemeral store");
        Ok(StoreLease::new(Box::new(store), label))
    }
}

/// Fresh document database in its own temp directory per lease.
#[derive(Debug, Clone, Default)]
pub struct EphemeralDocumentProvider {
    temp_root: Option<PathBuf>,
}

impl EphemeralDocumentProvider {
    /// Scratch directories in the system temp dir.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_temp_root(root: impl Into<PathBuf>) -> Self {
        Self { temp_root: Some(root.into()) }
    }

    /// Honour `temp_root` from `config`.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self { temp_root: config.temp_root.as_ref().map(PathBuf::from) }
    }
}

impl StoreProvider for EphemeralDocumentProvider {
    fn kind(&self) -> StoreKind {
        StoreKind::Document
    }

    fn acquire(&self) -> Result<StoreLease> {
        let dir = scratch_dir(self.temp_root.as_deref())?;
        let label = dir.path().display().to_string();
        let store = DocumentCatalogStore::open_in(dir)?;

        info!(store = %label, kind = %StoreKind::Document, "acquired ephemeral store");
        Ok(StoreLease::new(Box::new(store), label))
    }
}

/// Fresh schema on a PostgreSQL server per lease.
#[derive(Clone)]
pub struct PostgresProvider {
    url: String,
}

impl PostgresProvider {
    /// Provider for the server at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// # Errors
    /// `Config` when no connection string is configured.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        config
            .postgres_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(Self::new)
            .ok_or_else(|| {
                CadenceError::Config(
                    "postgres backend selected but CADENCE_POSTGRES_URL is not set".into(),
                )
            })
    }
}

impl fmt::Debug for PostgresProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresProvider").field("url", &"<redacted>").finish()
    }
}

impl StoreProvider for PostgresProvider {
    fn kind(&self) -> StoreKind {
        StoreKind::Postgres
    }

    fn acquire(&self) -> Result<StoreLease> {
        let store = PostgresCatalogStore::connect(&self.url)?;
        let label = store.schema().to_string();

        info!(store = %label, kind = %StoreKind::Postgres, "acquired ephemeral store");
        Ok(StoreLease::new(Box::new(store), label))
    }
}

/// Provider for `kind` built from the store configuration.
pub fn provider_for(kind: StoreKind, config: &StoreConfig) -> Result<Box<dyn StoreProvider>> {
    Ok(match kind {
        StoreKind::Document => Box::new(EphemeralDocumentProvider::from_config(config)),
        StoreKind::Sqlite => Box::new(EphemeralSqliteProvider::from_config(config)),
        StoreKind::Postgres => Box::new(PostgresProvider::from_config(config)?),
    })
}

/// Acquire a single store of `kind` outside an experiment.
pub fn acquire_store(kind: StoreKind, config: &StoreConfig) -> Result<StoreLease> {
    provider_for(kind, config)?.acquire()
}

fn scratch_dir(temp_root: Option<&Path>) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(EPHEMERAL_DIR_PREFIX);

    match temp_root {
        Some(root) => {
            std::fs::create_dir_all(root).map_err(map_io_error)?;
            builder.tempdir_in(root)
        }
        None => builder.tempdir(),
    }
    .map_err(map_io_error)
}

fn map_io_error(err: std::io::Error) -> CadenceError {
    CadenceError::from(InfraError::from(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_requires_url() {
        let err = PostgresProvider::from_config(&StoreConfig::default()).unwrap_err();
        assert!(matches!(err, CadenceError::Config(_)));

        let blank = StoreConfig { postgres_url: Some("  ".into()), temp_root: None };
        assert!(PostgresProvider::from_config(&blank).is_err());
    }

    #[test]
    fn provider_debug_redacts_url() {
        let provider = PostgresProvider::new("postgres://bench:hunter2@db/cadence");
        assert!(!format!("{provider:?}").contains("hunter2"));
    }

    #[test]
    fn providers_carry_kind_and_label() {
        let config = StoreConfig::default();
        let document = provider_for(StoreKind::Document, &config).unwrap();
        let sqlite = provider_for(StoreKind::Sqlite, &config).unwrap();

        assert_eq!(document.kind(), StoreKind::Document);
        assert_eq!(document.label(), "Document Store");
        assert_eq!(sqlite.label(), "SQLite");
        assert!(provider_for(StoreKind::Postgres, &config).is_err());
    }

    #[test]
    fn scratch_dirs_use_prefix_under_root() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("stores");
        let dir = scratch_dir(Some(&nested)).unwrap();

        assert!(dir.path().starts_with(&nested));
        let name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(EPHEMERAL_DIR_PREFIX));
    }
}
