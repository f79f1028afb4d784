//! Music catalog store abstraction

pub mod generator;
pub mod lease;
pub mod ports;
pub mod session;

pub use generator::{generate_entries, generate_entry};
pub use lease::StoreLease;
pub use ports::{CatalogStore, StoreProvider, SyntheticData};
pub use session::{run_scoped, CatalogSession};
