use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{
    ChatId, InventoryEntry, Medicine, MedicineId, NewMedicine, NewPharmacy, Owner, Pharmacy,
    PharmacyId, StockHit,
};
use crate::repository::{CatalogAdmin, CatalogStore, SnapshotTx, WriteTx};
use async_trait::async_trait;
use chrono::Utc;
use medicine_normalizer::{normalize, TrigramIndex};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct CatalogState {
    medicines: BTreeMap<MedicineId, Medicine>,
    name_index: TrigramIndex<MedicineId>,
    /// Normalized name or alias to the medicines carrying it
    name_keys: BTreeMap<String, BTreeSet<MedicineId>>,
    pharmacies: BTreeMap<PharmacyId, Pharmacy>,
    owners: BTreeMap<ChatId, PharmacyId>,
    inventory: BTreeSet<InventoryEntry>,
}

impl CatalogState {
    fn index_name(&mut self, id: MedicineId, name: &str, key: String) {
        self.name_index.insert(id, name);
        self.name_keys.entry(key).or_default().insert(id);
    }

    fn collect(&self, ids: impl IntoIterator<Item = MedicineId>) -> Vec<Medicine> {
        ids.into_iter()
            .filter_map(|id| self.medicines.get(&id).cloned())
            .collect()
    }

    fn check_owner(&self, owner: &Owner, staged: &[Owner], staged_pharmacies: &[Pharmacy]) -> DatabaseResult<()> {
        let pharmacy_known = self.pharmacies.contains_key(&owner.pharmacy_id)
            || staged_pharmacies.iter().any(|p| p.id == owner.pharmacy_id);
        if !pharmacy_known {
            return Err(DatabaseError::ConstraintViolation(format!(
                "pharmacy {} does not exist",
                owner.pharmacy_id
            )));
        }
        if self.owners.contains_key(&owner.chat_id) || staged.iter().any(|o| o.chat_id == owner.chat_id) {
            return Err(DatabaseError::ConstraintViolation(
                "chat already owns a pharmacy".to_string(),
            ));
        }
        if self.owners.values().any(|id| *id == owner.pharmacy_id)
            || staged.iter().any(|o| o.pharmacy_id == owner.pharmacy_id)
        {
            return Err(DatabaseError::ConstraintViolation(format!(
                "pharmacy {} already has an owner",
                owner.pharmacy_id
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
struct Shared {
    state: RwLock<Arc<CatalogState>>,
    fail_next_owner_insert: AtomicBool,
}

/// In-memory catalog store for development and tests.
///
/// Snapshots share the committed state by reference count; commits replace it
/// under the write lock, so a snapshot never observes a later commit.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    shared: Arc<Shared>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `insert_owner` call fail, to exercise rollback paths.
    pub fn fail_next_owner_insert(&self) {
        self.shared.fail_next_owner_insert.store(true, Ordering::SeqCst);
    }

    fn update<T>(&self, apply: impl FnOnce(&mut CatalogState) -> DatabaseResult<T>) -> DatabaseResult<T> {
        let mut guard = self.shared.state.write();
        let mut next = CatalogState::clone(&guard);
        let value = apply(&mut next)?;
        *guard = Arc::new(next);
        Ok(value)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn begin_snapshot(&self) -> DatabaseResult<Box<dyn SnapshotTx>> {
        let state = self.shared.state.read().clone();
        Ok(Box::new(MemorySnapshotTx { state }))
    }

    async fn begin_write(&self) -> DatabaseResult<Box<dyn WriteTx>> {
        Ok(Box::new(MemoryWriteTx {
            shared: Arc::clone(&self.shared),
            pharmacies: Vec::new(),
            owners: Vec::new(),
        }))
    }
}

struct MemorySnapshotTx {
    state: Arc<CatalogState>,
}

#[async_trait]
impl SnapshotTx for MemorySnapshotTx {
    async fn medicine_candidates(
        &mut self,
        key: &str,
        floor: f64,
        limit: usize,
    ) -> DatabaseResult<Vec<Medicine>> {
        let mut ids: Vec<MedicineId> = self
            .state
            .name_keys
            .get(key)
            .map(|exact| exact.iter().copied().collect())
            .unwrap_or_default();

        // Exact keys come first, whatever the floor or limit.
        for (id, _) in self.state.name_index.candidates(key, floor, limit) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        Ok(self.state.collect(ids))
    }

    async fn medicines_by_key_length(
        &mut self,
        min_chars: usize,
        max_chars: usize,
    ) -> DatabaseResult<Vec<Medicine>> {
        let ids: BTreeSet<MedicineId> = self
            .state
            .name_keys
            .iter()
            .filter(|(key, _)| (min_chars..=max_chars).contains(&key.chars().count()))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();

        Ok(self.state.collect(ids))
    }

    async fn stocking_pharmacies(
        &mut self,
        medicine_ids: &[MedicineId],
    ) -> DatabaseResult<Vec<StockHit>> {
        Ok(self
            .state
            .inventory
            .iter()
            .filter(|entry| medicine_ids.contains(&entry.medicine_id))
            .filter_map(|entry| {
                self.state.pharmacies.get(&entry.pharmacy_id).map(|pharmacy| StockHit {
                    pharmacy: pharmacy.clone(),
                    medicine_id: entry.medicine_id,
                })
            })
            .collect())
    }

    async fn finish(self: Box<Self>) -> DatabaseResult<()> {
        Ok(())
    }
}

struct MemoryWriteTx {
    shared: Arc<Shared>,
    pharmacies: Vec<Pharmacy>,
    owners: Vec<Owner>,
}

#[async_trait]
impl WriteTx for MemoryWriteTx {
    async fn insert_pharmacy(&mut self, pharmacy: &NewPharmacy) -> DatabaseResult<PharmacyId> {
        let id = PharmacyId::new();
        self.pharmacies.push(Pharmacy {
            id,
            name: pharmacy.name.clone(),
            address: pharmacy.address.clone(),
            phone: pharmacy.phone.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn insert_owner(&mut self, owner: &Owner) -> DatabaseResult<()> {
        if self.shared.fail_next_owner_insert.swap(false, Ordering::SeqCst) {
            return Err(DatabaseError::QueryFailed("injected owner insert failure".to_string()));
        }
        self.shared
            .state
            .read()
            .check_owner(owner, &self.owners, &self.pharmacies)?;
        self.owners.push(*owner);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DatabaseResult<()> {
        let mut guard = self.shared.state.write();

        // Re-check against whatever committed since the owners were staged.
        let mut checked: Vec<Owner> = Vec::with_capacity(self.owners.len());
        for owner in &self.owners {
            guard.check_owner(owner, &checked, &self.pharmacies)?;
            checked.push(*owner);
        }

        let mut next = CatalogState::clone(&guard);
        for pharmacy in self.pharmacies {
            next.pharmacies.insert(pharmacy.id, pharmacy);
        }
        for owner in self.owners {
            next.owners.insert(owner.chat_id, owner.pharmacy_id);
        }
        *guard = Arc::new(next);
        debug!("In-memory write transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DatabaseResult<()> {
        debug!(
            staged_pharmacies = self.pharmacies.len(),
            "In-memory write transaction rolled back"
        );
        Ok(())
    }
}

#[async_trait]
impl CatalogAdmin for InMemoryCatalogStore {
    async fn add_medicine(&self, medicine: &NewMedicine) -> DatabaseResult<MedicineId> {
        let mut keys = Vec::with_capacity(medicine.aliases.len() + 1);
        for name in std::iter::once(&medicine.name).chain(medicine.aliases.iter()) {
            let key = normalize(name);
            if key.is_empty() {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "medicine name {:?} has no usable characters",
                    name
                )));
            }
            keys.push((name.as_str(), key));
        }

        self.update(|state| {
            if state.medicines.values().any(|m| m.name == medicine.name) {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "medicine {:?} already exists",
                    medicine.name
                )));
            }
            let id = MedicineId::new();
            for (name, key) in &keys {
                state.index_name(id, name, key.clone());
            }
            state.medicines.insert(
                id,
                Medicine {
                    id,
                    name: medicine.name.clone(),
                    aliases: medicine.aliases.clone(),
                },
            );
            Ok(id)
        })
    }

    async fn add_alias(&self, medicine_id: MedicineId, alias: &str) -> DatabaseResult<()> {
        let key = normalize(alias);
        if key.is_empty() {
            return Err(DatabaseError::ConstraintViolation(format!(
                "alias {:?} has no usable characters",
                alias
            )));
        }

        self.update(|state| {
            let known = state
                .name_keys
                .get(&key)
                .is_some_and(|ids| ids.contains(&medicine_id));
            let medicine = state
                .medicines
                .get_mut(&medicine_id)
                .ok_or_else(|| DatabaseError::NotFound(format!("medicine {}", medicine_id)))?;
            if known {
                return Ok(());
            }
            medicine.aliases.push(alias.to_string());
            state.index_name(medicine_id, alias, key.clone());
            Ok(())
        })
    }

    async fn add_stock(&self, entry: InventoryEntry) -> DatabaseResult<()> {
        self.update(|state| {
            if !state.pharmacies.contains_key(&entry.pharmacy_id) {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "pharmacy {} does not exist",
                    entry.pharmacy_id
                )));
            }
            if !state.medicines.contains_key(&entry.medicine_id) {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "medicine {} does not exist",
                    entry.medicine_id
                )));
            }
            state.inventory.insert(entry);
            Ok(())
        })
    }

    async fn list_pharmacies(&self) -> DatabaseResult<Vec<Pharmacy>> {
        let state = self.shared.state.read().clone();
        let mut pharmacies: Vec<Pharmacy> = state.pharmacies.values().cloned().collect();
        pharmacies.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(pharmacies)
    }

    async fn pharmacy_by_owner(&self, chat_id: ChatId) -> DatabaseResult<Option<Pharmacy>> {
        let state = self.shared.state.read().clone();
        Ok(state
            .owners
            .get(&chat_id)
            .and_then(|id| state.pharmacies.get(id))
            .cloned())
    }
}
