use database_layer::models::{ChatId, InventoryEntry, MedicineId, NewMedicine, PharmacyId};
use database_layer::{CatalogAdmin, InMemoryCatalogStore};
use pharmacy_search::{register, PharmacyPayload, PharmacySearch, SearchError, SearchOutcome};
use std::sync::Arc;

struct Catalog {
    store: Arc<InMemoryCatalogStore>,
    paracetamol: MedicineId,
    tylolhot: MedicineId,
    trimol: MedicineId,
}

async fn pharmacy(store: &InMemoryCatalogStore, chat: i64, name: &str) -> PharmacyId {
    let payload = PharmacyPayload {
        name: name.to_string(),
        address: format!("{}, ул. Ленина, 1", name),
        phone: "+7 900 123-45-67".to_string(),
    };
    register(store, ChatId(chat), payload).await.unwrap()
}

async fn stock(store: &InMemoryCatalogStore, pharmacy_id: PharmacyId, medicine_id: MedicineId) {
    store
        .add_stock(InventoryEntry { pharmacy_id, medicine_id })
        .await
        .unwrap();
}

async fn seeded() -> Catalog {
    let store = Arc::new(InMemoryCatalogStore::new());
    let paracetamol = store
        .add_medicine(&NewMedicine::new("Парацетамол").with_alias("Paracetamol"))
        .await
        .unwrap();
    let tylolhot = store.add_medicine(&NewMedicine::new("ТайлолХот")).await.unwrap();
    let trimol = store.add_medicine(&NewMedicine::new("Тримол")).await.unwrap();
    Catalog {
        store,
        paracetamol,
        tylolhot,
        trimol,
    }
}

fn search(catalog: &Catalog) -> PharmacySearch {
    PharmacySearch::new(catalog.store.clone())
}

#[tokio::test]
async fn test_misspelled_and_exact_names_rank_fuller_pharmacy_first() {
    let catalog = seeded().await;
    let a = pharmacy(&catalog.store, 1, "Аптека А").await;
    let b = pharmacy(&catalog.store, 2, "Аптека Б").await;
    stock(&catalog.store, a, catalog.paracetamol).await;
    stock(&catalog.store, b, catalog.paracetamol).await;
    stock(&catalog.store, b, catalog.tylolhot).await;

    let outcome = search(&catalog).search_text("Парацетомол, тайлолхот").await.unwrap();
    let SearchOutcome::Available { groups, resolution, raw } = outcome else {
        panic!("expected availability");
    };

    assert_eq!(raw, "Парацетомол, тайлолхот");
    assert_eq!(resolution.resolved_ids(), vec![catalog.paracetamol, catalog.tylolhot]);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].pharmacy.name, "Аптека Б");
    assert_eq!(groups[0].medicines, vec!["Парацетамол", "ТайлолХот"]);
    assert_eq!(groups[1].pharmacy.name, "Аптека А");
    assert_eq!(groups[1].medicines, vec!["Парацетамол"]);
}

#[tokio::test]
async fn test_unknown_name_is_no_resolved_medicines() {
    let catalog = seeded().await;
    let a = pharmacy(&catalog.store, 1, "Аптека А").await;
    stock(&catalog.store, a, catalog.trimol).await;

    let outcome = search(&catalog).search_text("несуществующее").await.unwrap();
    match outcome {
        SearchOutcome::NoResolvedMedicines { raw, resolution } => {
            assert_eq!(raw, "несуществующее");
            assert_eq!(resolution.unresolved().collect::<Vec<_>>(), vec!["несуществующее"]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_medicine_stocked_by_nobody_is_no_availability() {
    let catalog = seeded().await;
    let a = pharmacy(&catalog.store, 1, "Аптека А").await;
    stock(&catalog.store, a, catalog.paracetamol).await;

    let outcome = search(&catalog).search_text("Тримол").await.unwrap();
    match outcome {
        SearchOutcome::NoAvailability { raw, resolution } => {
            assert_eq!(raw, "Тримол");
            assert_eq!(resolution.resolved_ids(), vec![catalog.trimol]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_partially_resolved_query_returns_matched_stock() {
    let catalog = seeded().await;
    let a = pharmacy(&catalog.store, 1, "Аптека А").await;
    stock(&catalog.store, a, catalog.trimol).await;

    let outcome = search(&catalog)
        .search_tokens(vec!["тримол".into(), "абракадабра".into()])
        .await
        .unwrap();
    let SearchOutcome::Available { groups, resolution, .. } = outcome else {
        panic!("expected availability");
    };
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].medicines, vec!["Тримол"]);
    assert_eq!(resolution.unresolved().collect::<Vec<_>>(), vec!["абракадабра"]);
}

#[tokio::test]
async fn test_duplicate_tokens_list_medicine_once() {
    let catalog = seeded().await;
    let a = pharmacy(&catalog.store, 1, "Аптека А").await;
    stock(&catalog.store, a, catalog.paracetamol).await;

    let outcome = search(&catalog)
        .search_text("парацетамол, Paracetamol; ПАРАЦЕТАМОЛ")
        .await
        .unwrap();
    let SearchOutcome::Available { groups, .. } = outcome else {
        panic!("expected availability");
    };
    assert_eq!(groups[0].medicines, vec!["Парацетамол"]);
}

#[tokio::test]
async fn test_input_bounds_rejected_before_resolution() {
    let catalog = seeded().await;
    let text = vec!["тримол"; 11].join(", ");
    let result = search(&catalog).search_text(&text).await;
    assert!(matches!(result, Err(SearchError::InputTooLarge(_))));
}

#[tokio::test]
async fn test_stricter_threshold_rejects_misspelling() {
    let catalog = seeded().await;
    let a = pharmacy(&catalog.store, 1, "Аптека А").await;
    stock(&catalog.store, a, catalog.paracetamol).await;

    let strict = pharmacy_search::MedicineResolver::default().with_threshold(0.95);
    let outcome = search(&catalog)
        .with_resolver(strict)
        .search_text("парацетомол")
        .await
        .unwrap();
    assert!(matches!(outcome, SearchOutcome::NoResolvedMedicines { .. }));
}

#[tokio::test]
async fn test_scattered_misspellings_at_threshold_resolve() {
    let store = Arc::new(InMemoryCatalogStore::new());
    let amoxicillin = store
        .add_medicine(&NewMedicine::new("Амоксициллинекс"))
        .await
        .unwrap();
    let nurofen = store
        .add_medicine(&NewMedicine::new("Нурофенэкспрессфорте"))
        .await
        .unwrap();
    store.add_medicine(&NewMedicine::new("Тримол")).await.unwrap();
    let a = pharmacy(&store, 1, "Аптека А").await;
    stock(&store, a, amoxicillin).await;
    stock(&store, a, nurofen).await;

    // Both tokens sit exactly at 0.8 yet share under 30% of their trigrams.
    let outcome = PharmacySearch::new(store.clone())
        .search_text("амыксицыллиныкс, нулофемэкзпрессфарте")
        .await
        .unwrap();
    let SearchOutcome::Available { groups, resolution, .. } = outcome else {
        panic!("expected availability");
    };

    assert_eq!(resolution.resolved_ids(), vec![amoxicillin, nurofen]);
    assert!(resolution.resolved.iter().all(|m| (m.score - 0.8).abs() < 1e-9));
    assert_eq!(groups[0].medicines, vec!["Амоксициллинекс", "Нурофенэкспрессфорте"]);
}

#[tokio::test]
async fn test_candidate_limit_does_not_hide_better_match() {
    let store = Arc::new(InMemoryCatalogStore::new());
    // The long name shares every trigram of the key, so it tops the shortlist.
    store
        .add_medicine(&NewMedicine::new("Тримолоксан"))
        .await
        .unwrap();
    let trimal = store.add_medicine(&NewMedicine::new("Тримал")).await.unwrap();

    let resolver = pharmacy_search::MedicineResolver::new(&config_engine::MatchingSettings {
        threshold: 0.5,
        candidate_floor: 0.3,
        candidate_limit: 1,
    });
    let outcome = PharmacySearch::new(store.clone())
        .with_resolver(resolver)
        .search_text("тримол")
        .await
        .unwrap();

    assert_eq!(outcome.resolution().resolved_ids(), vec![trimal]);
}
