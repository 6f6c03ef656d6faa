// Chat reply texts
use error_common::AptekaError;
use pharmacy_search::{PharmacyGroup, SearchOutcome};

pub const REGISTRATION_SUCCESS: &str = "Аптека успешно создана ✅";

/// One message per pharmacy
pub fn pharmacy_group(group: &PharmacyGroup) -> String {
    format!(
        "Аптека: {}\nАдрес: {}\nPhone: {}\n\nВ наличии: {}",
        group.pharmacy.name,
        group.pharmacy.address,
        group.pharmacy.phone,
        group.medicines.join(", ")
    )
}

pub fn no_availability(raw: &str) -> String {
    format!("Не нашел данные лекарства ни в одной из аптек: {}", raw)
}

pub fn no_resolved_medicines(raw: &str) -> String {
    format!("Не удалось распознать названия лекарств: {}", raw)
}

/// Messages for a search outcome, in delivery order
pub fn for_outcome(outcome: &SearchOutcome) -> Vec<String> {
    match outcome {
        SearchOutcome::Available { groups, .. } => groups.iter().map(pharmacy_group).collect(),
        SearchOutcome::NoAvailability { raw, .. } => vec![no_availability(raw)],
        SearchOutcome::NoResolvedMedicines { raw, .. } => vec![no_resolved_medicines(raw)],
    }
}

pub fn for_error(err: &AptekaError) -> String {
    err.user_message().to_string()
}
