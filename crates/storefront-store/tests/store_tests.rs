//! Integration tests for typed collections and object storage.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use storefront_core::{Coupon, Photo, Product};
use storefront_store::{
    Collection, DocumentStore, Filter, FindOptions, LocalObjectStore, MemoryStore, ObjectStore,
    SortOrder, StoreError, Upload,
};

fn product(id: &str, category: &str, price: f64, day: u32) -> Product {
    let created = Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap();
    Product {
        id: id.to_string(),
        name: format!("Item {id}"),
        photos: vec![Photo {
            public_id: format!("ph-{id}"),
            url: format!("/uploads/ph-{id}"),
        }],
        price,
        stock: 4,
        category: category.to_string(),
        description: "test".to_string(),
        ratings: 0,
        num_reviews: 0,
        created_at: created,
        updated_at: created,
    }
}

fn products() -> (Arc<MemoryStore>, Collection<Product>) {
    let store = Arc::new(MemoryStore::new());
    let collection = Collection::new(store.clone() as Arc<dyn DocumentStore>);
    (store, collection)
}

#[tokio::test]
async fn test_collection_round_trip() {
    let (store, products) = products();
    let lamp = product("p1", "lighting", 120.0, 1);

    products.insert(&lamp).await.unwrap();

    assert_eq!(store.len("products"), 1);
    assert_eq!(products.find_by_id("p1").await.unwrap(), Some(lamp));
    assert_eq!(products.find_by_id("nope").await.unwrap(), None);
}

#[tokio::test]
async fn test_collection_documents_use_underscore_id() {
    let (store, products) = products();
    products
        .insert(&product("p1", "lighting", 120.0, 1))
        .await
        .unwrap();

    let raw = store.find_by_id("products", "p1").await.unwrap().unwrap();
    assert_eq!(raw["_id"], "p1");
    assert_eq!(raw["numReviews"], 0);
}

#[tokio::test]
async fn test_save_requires_existing_document() {
    let (_, products) = products();
    let mut lamp = product("p1", "lighting", 100.0, 1);

    let err = products.save(&lamp).await.unwrap_err();
    assert!(matches!(err, StoreError::Missing { .. }));

    products.insert(&lamp).await.unwrap();
    lamp.price = 150.0;
    products.save(&lamp).await.unwrap();

    let stored = products.find_by_id("p1").await.unwrap().unwrap();
    assert_eq!(stored.price, 150.0);
}

#[tokio::test]
async fn test_find_with_filter_and_paging() {
    let (_, products) = products();
    for (i, (category, price)) in [
        ("lighting", 10.0),
        ("desk", 20.0),
        ("lighting", 30.0),
        ("lighting", 40.0),
    ]
    .into_iter()
    .enumerate()
    {
        let id = format!("p{i}");
        products
            .insert(&product(&id, category, price, i as u32 + 1))
            .await
            .unwrap();
    }

    let filter = Filter::all().eq("category", "lighting").lte("price", 35.0);
    let page = products
        .find_with(
            &filter,
            &FindOptions::new().sort_by("price", SortOrder::Desc).limit(1),
        )
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].price, 30.0);
    assert_eq!(products.count(&filter).await.unwrap(), 2);

    let categories = products.distinct_strings("category").await.unwrap();
    assert_eq!(categories, vec!["lighting".to_string(), "desk".to_string()]);
}

#[tokio::test]
async fn test_find_one_and_delete() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let coupons: Collection<Coupon> = Collection::new(store);
    let coupon = Coupon {
        id: "c1".to_string(),
        code: "SAVE10".to_string(),
        amount: 10.0,
    };
    coupons.insert(&coupon).await.unwrap();

    let found = coupons
        .find_one(&Filter::all().eq("code", "SAVE10"))
        .await
        .unwrap();
    assert_eq!(found, Some(coupon));

    assert!(coupons.delete("c1").await.unwrap());
    assert!(!coupons.delete("c1").await.unwrap());
    assert!(coupons.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_local_object_store_writes_and_deletes() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path().join("uploads"), "/uploads");

    let stored = store
        .upload(Upload::new("photo.png", b"png-bytes".to_vec()))
        .await
        .unwrap();

    assert!(stored.id.ends_with(".png"));
    assert_eq!(stored.url, format!("/uploads/{}", stored.id));

    let path = store.dir().join(&stored.id);
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"png-bytes");

    store.delete(&stored.id).await.unwrap();
    assert!(!path.exists());

    // Deleting again is not an error
    store.delete(&stored.id).await.unwrap();
}

#[tokio::test]
async fn test_local_object_store_rejects_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path(), "/uploads");

    let err = store.delete("../outside.png").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidObject { .. }));
}

#[tokio::test]
async fn test_upload_many_and_delete_many() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path(), "/uploads");

    let stored = store
        .upload_many(vec![
            Upload::new("a.jpg", b"a".to_vec()),
            Upload::new("b", b"b".to_vec()).with_content_type("image/webp"),
        ])
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored[1].id.ends_with(".webp"));

    let ids: Vec<String> = stored.iter().map(|s| s.id.clone()).collect();
    store.delete_many(&ids).await.unwrap();
    for id in &ids {
        assert!(!dir.path().join(id).exists());
    }
}
