// Catalog models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicineId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PharmacyId(pub Uuid);

/// Messaging-channel identifier of a chat (Telegram chat id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl MedicineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MedicineId {
    fn default() -> Self {
        Self::new()
    }
}

impl PharmacyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PharmacyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MedicineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for PharmacyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Canonical drug entity. Only aliases are ever added after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: MedicineId,
    pub name: String,
    pub aliases: Vec<String>,
}

impl Medicine {
    /// Canonical name first, then aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedicine {
    pub name: String,
    pub aliases: Vec<String>,
}

impl NewMedicine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: PharmacyId,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Already-validated pharmacy attributes for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPharmacy {
    pub name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub chat_id: ChatId,
    pub pharmacy_id: PharmacyId,
}

/// Presence of a medicine in a pharmacy; no quantity, no price
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub pharmacy_id: PharmacyId,
    pub medicine_id: MedicineId,
}

/// One inventory row joined to its pharmacy
#[derive(Debug, Clone, PartialEq)]
pub struct StockHit {
    pub pharmacy: Pharmacy,
    pub medicine_id: MedicineId,
}
