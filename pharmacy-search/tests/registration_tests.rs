use database_layer::models::ChatId;
use database_layer::{CatalogAdmin, InMemoryCatalogStore};
use pharmacy_search::{register, PharmacyPayload, SearchError};

fn payload(name: &str) -> PharmacyPayload {
    PharmacyPayload {
        name: name.to_string(),
        address: "пр. Мира, 10".to_string(),
        phone: "8 (800) 555-35-35".to_string(),
    }
}

#[tokio::test]
async fn test_register_creates_owned_pharmacy() {
    let store = InMemoryCatalogStore::new();
    let id = register(&store, ChatId(77), payload("Ромашка")).await.unwrap();

    let owned = store.pharmacy_by_owner(ChatId(77)).await.unwrap().unwrap();
    assert_eq!(owned.id, id);
    assert_eq!(owned.phone, "8 (800) 555-35-35");
}

#[tokio::test]
async fn test_owner_insert_failure_leaves_no_pharmacy() {
    let store = InMemoryCatalogStore::new();
    store.fail_next_owner_insert();

    let result = register(&store, ChatId(77), payload("Ромашка")).await;
    assert!(matches!(result, Err(SearchError::Persistence(_))));

    assert!(store.list_pharmacies().await.unwrap().is_empty());
    assert!(store.pharmacy_by_owner(ChatId(77)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_payload_writes_nothing() {
    let store = InMemoryCatalogStore::new();
    let mut bad = payload("Ромашка");
    bad.phone = "123".to_string();

    let result = register(&store, ChatId(77), bad).await;
    assert!(matches!(result, Err(SearchError::Validation(_))));
    assert!(store.list_pharmacies().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_registration_for_chat_is_rejected_atomically() {
    let store = InMemoryCatalogStore::new();
    register(&store, ChatId(5), payload("Первая")).await.unwrap();

    let result = register(&store, ChatId(5), payload("Вторая")).await;
    assert!(matches!(result, Err(SearchError::Persistence(_))));

    let names: Vec<String> = store
        .list_pharmacies()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Первая".to_string()]);
}

#[tokio::test]
async fn test_json_payload_round_trip_into_store() {
    let store = InMemoryCatalogStore::new();
    let payload = PharmacyPayload::from_json(
        r#"{"name":"Здоровье","address":"ул. Садовая, 5","phone":"+996 555 12-34-56"}"#,
    )
    .unwrap();
    register(&store, ChatId(9), payload).await.unwrap();
    assert_eq!(store.list_pharmacies().await.unwrap()[0].name, "Здоровье");
}
