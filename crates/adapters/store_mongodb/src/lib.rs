//! # needlehub-adapter-store-mongodb
//!
//! `MongoDB` document store adapter using the official [mongodb](https://docs.rs/mongodb) driver.
//!
//! ## Responsibilities
//! - Implement the `DocumentStore` and `StoreConnection` ports defined in `needlehub-app::ports`
//! - Open one client per sensor binding and verify it with a `ping`
//! - Run the `[{"$count": "count"}]` aggregation and map result documents to count rows
//! - Shut the client down when the connection is released
//!
//! ## Dependency rule
//! Depends on `needlehub-app` (for port traits) and `needlehub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod store;

pub use store::{MongoConnection, MongoStore, MongoStoreConfig};
