use proddx_core::store::memory::{MemoryCompanyStore, MemoryProductStore, MemoryReviewStore};
use proddx_core::{
    Company, CompanyStore, Product, ProductFilter, ProductStore, RecordKind, Review,
    ReviewFilter, ReviewStore, StoreError,
};
use std::sync::Arc;
use std::thread;
use uuid::Uuid;

#[test]
fn list_on_empty_store_reports_empty_collection() {
    let store = MemoryProductStore::new();

    let err = store.list(&ProductFilter::default()).unwrap_err();
    assert!(matches!(
        err,
        StoreError::EmptyCollection {
            kind: RecordKind::Product
        }
    ));
    assert_eq!(err.to_string(), "no products found");
}

#[test]
fn list_with_no_matching_filter_reports_empty_collection() {
    let store = MemoryProductStore::new();
    store
        .save(Product::new(Uuid::new_v4(), "Widget").into())
        .unwrap();

    let err = store
        .list(&ProductFilter::for_company(Uuid::new_v4()))
        .unwrap_err();
    assert!(matches!(err, StoreError::EmptyCollection { .. }));
}

#[test]
fn list_returns_records_in_insertion_order() {
    let store = MemoryCompanyStore::new();
    let first = Company::new(Uuid::new_v4(), "First", "1@x.com");
    let second = Company::new(Uuid::new_v4(), "Second", "2@x.com");
    store.save(first.clone().into()).unwrap();
    store.save(second.clone().into()).unwrap();

    assert_eq!(store.list().unwrap(), vec![first, second]);
}

#[test]
fn delete_only_removes_matching_record() {
    let store = MemoryReviewStore::new();
    let kept = Review::new(Uuid::new_v4(), Uuid::new_v4(), "keep", 5);
    let removed = Review::new(Uuid::new_v4(), Uuid::new_v4(), "remove", 1);
    store.save(kept.clone().into()).unwrap();
    store.save(removed.clone().into()).unwrap();

    store.delete(removed.id).unwrap();

    assert_eq!(store.list(&ReviewFilter::default()).unwrap(), vec![kept]);
    assert!(store.delete(removed.id).unwrap_err().is_not_found());
}

#[test]
fn concurrent_saves_are_all_kept() {
    let store = Arc::new(MemoryProductStore::new());
    let company_id = Uuid::new_v4();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for index in 0..25 {
                    store
                        .save(Product::new(company_id, format!("w{worker}-p{index}")).into())
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 200);
    assert_eq!(
        store
            .list(&ProductFilter::for_company(company_id))
            .unwrap()
            .len(),
        200
    );
}
