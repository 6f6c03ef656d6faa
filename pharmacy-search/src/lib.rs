//! Medicine availability search and pharmacy registration
//!
//! The query path turns free text into tokens, resolves each token to a
//! catalog medicine by fuzzy matching, collects the pharmacies stocking the
//! resolved medicines and ranks them. Every read of one query happens inside a
//! single snapshot transaction.
//!
//! The registration path validates a pharmacy payload and writes the pharmacy
//! together with its owning chat as one unit of work.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use database_layer::InMemoryCatalogStore;
//! use pharmacy_search::{PharmacySearch, SearchOutcome};
//!
//! # async fn example() -> Result<(), pharmacy_search::SearchError> {
//! let search = PharmacySearch::new(Arc::new(InMemoryCatalogStore::new()));
//! match search.search_text("Парацетомол, тайлолхот").await? {
//!     SearchOutcome::Available { groups, .. } => println!("{} pharmacies", groups.len()),
//!     other => println!("nothing for {}", other.raw()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod validation;

pub mod aggregator;
pub mod error;
pub mod query;
pub mod ranker;
pub mod registration;
pub mod resolver;
pub mod service;

pub use aggregator::PharmacyGroup;
pub use error::{SearchError, SearchResult};
pub use query::Query;
pub use registration::{register, PharmacyPayload};
pub use resolver::{MedicineResolver, Resolution, ResolvedMedicine, TokenMatch};
pub use service::{PharmacySearch, SearchOutcome};
