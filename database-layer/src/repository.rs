//! Storage seams for the catalog.
//!
//! Searches run against a [`SnapshotTx`] so every read of one query observes a
//! single committed state. Registrations run through a [`WriteTx`] whose
//! effects become visible only on commit.

use crate::error::DatabaseResult;
use crate::models::{
    ChatId, InventoryEntry, Medicine, MedicineId, NewMedicine, NewPharmacy, Owner, Pharmacy,
    PharmacyId, StockHit,
};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCatalogStore;
pub use postgres::PgCatalogStore;

/// Entry point for opening catalog transactions
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Open a read-only consistent snapshot
    async fn begin_snapshot(&self) -> DatabaseResult<Box<dyn SnapshotTx>>;

    /// Open a write transaction. Dropping it without commit discards all writes.
    async fn begin_write(&self) -> DatabaseResult<Box<dyn WriteTx>>;
}

/// Read-only view of one committed catalog state
#[async_trait]
pub trait SnapshotTx: Send {
    /// Medicines whose canonical name or an alias is trigram-similar to
    /// `key` at or above `floor`, best first, at most `limit`.
    ///
    /// A medicine with a name whose normalized form equals `key` is always
    /// included.
    async fn medicine_candidates(
        &mut self,
        key: &str,
        floor: f64,
        limit: usize,
    ) -> DatabaseResult<Vec<Medicine>>;

    /// Every medicine with at least one name whose normalized key is
    /// `min_chars..=max_chars` characters long, ordered by id.
    ///
    /// Unlike [`medicine_candidates`](Self::medicine_candidates) this is
    /// complete: nothing inside the band is left out.
    async fn medicines_by_key_length(
        &mut self,
        min_chars: usize,
        max_chars: usize,
    ) -> DatabaseResult<Vec<Medicine>>;

    /// Every inventory row for the given medicines, joined to its pharmacy
    async fn stocking_pharmacies(
        &mut self,
        medicine_ids: &[MedicineId],
    ) -> DatabaseResult<Vec<StockHit>>;

    /// Release the snapshot
    async fn finish(self: Box<Self>) -> DatabaseResult<()>;
}

/// Unit of work for registrations
#[async_trait]
pub trait WriteTx: Send {
    async fn insert_pharmacy(&mut self, pharmacy: &NewPharmacy) -> DatabaseResult<PharmacyId>;

    async fn insert_owner(&mut self, owner: &Owner) -> DatabaseResult<()>;

    async fn commit(self: Box<Self>) -> DatabaseResult<()>;

    async fn rollback(self: Box<Self>) -> DatabaseResult<()>;
}

/// Catalog maintenance outside the query path
#[async_trait]
pub trait CatalogAdmin: Send + Sync {
    async fn add_medicine(&self, medicine: &NewMedicine) -> DatabaseResult<MedicineId>;

    async fn add_alias(&self, medicine_id: MedicineId, alias: &str) -> DatabaseResult<()>;

    /// Record presence of a medicine in a pharmacy. Idempotent.
    async fn add_stock(&self, entry: InventoryEntry) -> DatabaseResult<()>;

    async fn list_pharmacies(&self) -> DatabaseResult<Vec<Pharmacy>>;

    async fn pharmacy_by_owner(&self, chat_id: ChatId) -> DatabaseResult<Option<Pharmacy>>;
}
