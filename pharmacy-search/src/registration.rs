//! Atomic pharmacy registration.
//!
//! The pharmacy and its owning chat are inserted in one unit of work: either
//! both rows commit or neither is visible.

use crate::error::SearchResult;
use crate::validation::RequestValidation;
use crate::{validate_length, validate_phone, validate_required};
use database_layer::models::{ChatId, NewPharmacy, Owner, PharmacyId};
use database_layer::{transact, CatalogStore};
use logger_redacted::PiiRedactor;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Pharmacy attributes submitted from the registration form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyPayload {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl PharmacyPayload {
    /// Deserialize a JSON payload and validate it
    pub fn from_json(json: &str) -> SearchResult<Self> {
        let payload: Self = serde_json::from_str(json)?;
        payload.validate()?;
        Ok(payload)
    }

    fn into_new_pharmacy(self) -> NewPharmacy {
        NewPharmacy {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

impl RequestValidation for PharmacyPayload {
    fn validate(&self) -> SearchResult<()> {
        validate_required!(self.name, "Pharmacy name is required");
        validate_length!(self.name, 1, 200, "Name must be between 1 and 200 characters");
        validate_required!(self.address, "Address is required");
        validate_length!(self.address, 1, 300, "Address must be between 1 and 300 characters");
        validate_phone!(self.phone, "Phone must contain 5 to 20 digits");
        Ok(())
    }
}

/// Validate `payload` and create the pharmacy owned by `chat_id`.
pub async fn register<S>(store: &S, chat_id: ChatId, payload: PharmacyPayload) -> SearchResult<PharmacyId>
where
    S: CatalogStore + ?Sized,
{
    payload.validate()?;

    let redactor = PiiRedactor::default();
    let chat = redactor.chat_id(chat_id.0);
    let phone = redactor.redact(&payload.phone);
    let pharmacy = payload.into_new_pharmacy();

    let result = transact(store, move |tx| {
        Box::pin(async move {
            let pharmacy_id = tx.insert_pharmacy(&pharmacy).await?;
            tx.insert_owner(&Owner {
                chat_id,
                pharmacy_id,
            })
            .await?;
            Ok(pharmacy_id)
        })
    })
    .await;

    match result {
        Ok(pharmacy_id) => {
            info!(%pharmacy_id, chat = %chat, phone = %phone, "Pharmacy registered");
            Ok(pharmacy_id)
        }
        Err(e) => {
            warn!(chat = %chat, error = %e, "Pharmacy registration rolled back");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;

    #[test]
    fn test_from_json_valid() {
        let payload = PharmacyPayload::from_json(
            r#"{"name": " Ромашка ", "address": "ул. Ленина, 1", "phone": "+7 (900) 123-45-67"}"#,
        )
        .unwrap();
        assert_eq!(payload.into_new_pharmacy().name, "Ромашка");
    }

    #[test]
    fn test_from_json_malformed() {
        let result = PharmacyPayload::from_json(r#"{"name": "Ромашка""#);
        assert!(matches!(result, Err(SearchError::MalformedPayload(_))));

        let result = PharmacyPayload::from_json(r#"{"name": "Ромашка"}"#);
        assert!(matches!(result, Err(SearchError::MalformedPayload(_))));
    }

    #[test]
    fn test_from_json_invalid_fields() {
        for json in [
            r#"{"name": "  ", "address": "ул. Ленина, 1", "phone": "12345"}"#,
            r#"{"name": "Ромашка", "address": "", "phone": "12345"}"#,
            r#"{"name": "Ромашка", "address": "ул. Ленина, 1", "phone": "звоните"}"#,
        ] {
            assert!(matches!(
                PharmacyPayload::from_json(json),
                Err(SearchError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_name_length_limit() {
        let payload = PharmacyPayload {
            name: "я".repeat(201),
            address: "ул. Ленина, 1".to_string(),
            phone: "12345".to_string(),
        };
        assert!(payload.validate().is_err());
    }
}
