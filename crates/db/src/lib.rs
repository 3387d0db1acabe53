pub mod catalog;
pub mod checkpoint;
pub mod connection;
pub mod fixtures;
pub mod migrations;

pub use catalog::{CatalogError, CatalogService, OrderService, StaticCatalog};
pub use checkpoint::{CheckpointStore, InMemoryCheckpointStore, SqlCheckpointStore, StoreError};
pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{demo_dataset, SeedDataset};
