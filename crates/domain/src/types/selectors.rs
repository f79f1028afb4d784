//! Store and workload selectors

use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

/// Backend family a store belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Schemaless JSON collections
    Document,
    /// Normalized tables in an embedded SQLite file
    Sqlite,
    /// Normalized tables on a PostgreSQL server
    Postgres,
}

impl StoreKind {
    /// Every store kind in report order.
    pub const ALL: [StoreKind; 3] = [Self::Document, Self::Sqlite, Self::Postgres];

    /// Human readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Document => "Document Store",
            Self::Sqlite => "SQLite",
            Self::Postgres => "Postgres",
        }
    }

    /// True for the table-based backends.
    pub fn is_relational(self) -> bool {
        !matches!(self, Self::Document)
    }
}

impl_domain_enum_conversions!(StoreKind {
    Document => "document" | "doc" | "mongo" | "mongodb",
    Sqlite => "sqlite" | "relational",
    Postgres => "postgres" | "postgresql" | "pg",
});

/// CRUD workload executed against a catalog store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workload {
    /// One entry at a time, one round trip per record
    Insert,
    /// All entries in a single bulk transaction
    InsertMany,
    /// Full "songs in a playlist" view over a seeded store
    Read,
    /// Rating update over the seeded songs
    Update,
    /// Oldest-first song deletion in per-trial batches
    Delete,
}

impl Workload {
    /// Every workload in report order.
    pub const ALL: [Workload; 5] =
        [Self::Insert, Self::InsertMany, Self::Read, Self::Update, Self::Delete];

    /// Human readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Insert => "Insert",
            Self::InsertMany => "Insert Many",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    /// Whether the store is seeded with `n` entries before timing starts.
    pub fn needs_seed(self) -> bool {
        matches!(self, Self::Read | Self::Update | Self::Delete)
    }
}

impl_domain_enum_conversions!(Workload {
    Insert => "insert" | "insert-one" | "insert_one",
    InsertMany => "insert-many" | "insert_many" | "bulk",
    Read => "read",
    Update => "update",
    Delete => "delete",
});
