//! Document store backend

pub mod db;
pub mod store;

pub use db::{Collection, Document, DocumentDb, Filter, Update};
pub use store::DocumentCatalogStore;
