//! Catalog persistence for Apteka Engine
//!
//! Medicines, pharmacies, their inventory and pharmacy owners, stored in
//! PostgreSQL (or in memory for development and tests).
//!
//! # Key Features
//!
//! - **Snapshot reads**: every search reads one repeatable-read, read-only
//!   transaction, so resolution and aggregation see the same catalog state
//! - **Atomic registration**: a pharmacy and its owning chat are written in one
//!   unit of work via [`transact`]
//! - **Trigram shortlisting**: `pg_trgm` GIN index over normalized names, mirrored
//!   in memory by `medicine_normalizer::TrigramIndex`
//!
//! # Example
//!
//! ```rust,no_run
//! use database_layer::{transact, DatabasePool, PgCatalogStore};
//! use database_layer::models::{ChatId, NewPharmacy, Owner};
//! use config_engine::DatabaseSettings;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DatabasePool::connect(&DatabaseSettings::default()).await?;
//! pool.migrate().await?;
//! let store = PgCatalogStore::new(pool);
//!
//! let pharmacy = NewPharmacy {
//!     name: "Ромашка".to_string(),
//!     address: "ул. Ленина, 1".to_string(),
//!     phone: "+7 900 000-00-00".to_string(),
//! };
//! let id = transact(&store, move |tx| {
//!     Box::pin(async move {
//!         let id = tx.insert_pharmacy(&pharmacy).await?;
//!         tx.insert_owner(&Owner { chat_id: ChatId(42), pharmacy_id: id }).await?;
//!         Ok(id)
//!     })
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod repository;
pub mod transaction;

pub use connection::DatabasePool;
pub use error::{DatabaseError, DatabaseResult};
pub use repository::{
    CatalogAdmin, CatalogStore, InMemoryCatalogStore, PgCatalogStore, SnapshotTx, WriteTx,
};
pub use transaction::{transact, AccessMode, IsolationLevel};
