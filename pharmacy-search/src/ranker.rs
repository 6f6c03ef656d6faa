use crate::aggregator::PharmacyGroup;
use database_layer::models::PharmacyId;
use medicine_normalizer::normalize;
use std::cmp::Reverse;

/// Case- and diacritic-insensitive sort key for pharmacy display names
pub fn collation_key(name: &str) -> String {
    normalize(name)
}

/// Order groups by number of matched medicines (most first), then by display
/// name, then by pharmacy id. The order is total, so any permutation of the
/// input ranks identically.
pub fn rank(mut groups: Vec<PharmacyGroup>) -> Vec<PharmacyGroup> {
    groups.sort_by_cached_key(|group| -> (Reverse<usize>, String, String, PharmacyId) {
        (
            Reverse(group.medicines.len()),
            collation_key(&group.pharmacy.name),
            group.pharmacy.name.clone(),
            group.pharmacy.id,
        )
    });
    groups
}
