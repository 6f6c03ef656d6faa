use crate::error::SearchResult;
use crate::resolver::Resolution;
use database_layer::models::{MedicineId, Pharmacy, PharmacyId, StockHit};
use database_layer::SnapshotTx;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// One pharmacy and the requested medicines it has in stock
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PharmacyGroup {
    pub pharmacy: Pharmacy,
    /// Canonical names, in query order, without duplicates
    pub medicines: Vec<String>,
}

/// Read stock for every resolved medicine from `snapshot` and group it by
/// pharmacy.
pub async fn aggregate(
    snapshot: &mut dyn SnapshotTx,
    resolution: &Resolution,
) -> SearchResult<Vec<PharmacyGroup>> {
    if resolution.is_empty() {
        return Ok(Vec::new());
    }
    let hits = snapshot
        .stocking_pharmacies(&resolution.resolved_ids())
        .await?;
    Ok(group_by_pharmacy(resolution, hits))
}

/// Group stock rows by pharmacy. Rows for medicines outside the resolution are
/// ignored and pharmacies left with nothing are dropped.
pub fn group_by_pharmacy(resolution: &Resolution, hits: Vec<StockHit>) -> Vec<PharmacyGroup> {
    let mut stocked: BTreeMap<PharmacyId, (Pharmacy, HashSet<MedicineId>)> = BTreeMap::new();
    for hit in hits {
        stocked
            .entry(hit.pharmacy.id)
            .or_insert_with(|| (hit.pharmacy, HashSet::new()))
            .1
            .insert(hit.medicine_id);
    }

    stocked
        .into_values()
        .filter_map(|(pharmacy, ids)| {
            let medicines: Vec<String> = resolution
                .resolved
                .iter()
                .filter(|m| ids.contains(&m.id))
                .map(|m| m.name.clone())
                .collect();
            (!medicines.is_empty()).then_some(PharmacyGroup { pharmacy, medicines })
        })
        .collect()
}
