use proddx_core::db::migrations::latest_version;
use proddx_core::db::open_db_in_memory;
use proddx_core::store::sqlite::{SqliteCompanyStore, SqliteProductStore, SqliteReviewStore};
use proddx_core::{
    Company, CompanyStore, Database, DatabaseOptions, DbError, Product, ProductFilter,
    ProductStore, ReviewFilter, ReviewStore, Storage, StoreError,
};
use rusqlite::Connection;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

fn database() -> Arc<Database> {
    Arc::new(Database::open_in_memory(DatabaseOptions::default()).unwrap())
}

#[test]
fn list_on_empty_table_returns_empty_vec() {
    let store = SqliteProductStore::new(database());

    let products = store.list(&ProductFilter::default()).unwrap();
    assert!(products.is_empty());
}

#[test]
fn list_filters_products_by_company() {
    let store = SqliteProductStore::new(database());
    let company_a = Uuid::new_v4();
    let company_b = Uuid::new_v4();
    let mut first = Product::new(company_a, "A1");
    first.created_at = 1;
    let mut second = Product::new(company_a, "A2");
    second.created_at = 2;
    let other = Product::new(company_b, "B1");
    for product in [&second, &other, &first] {
        store.save(product.clone().into()).unwrap();
    }

    let listed = store.list(&ProductFilter::for_company(company_a)).unwrap();
    assert_eq!(listed, vec![first, second]);
}

#[test]
fn update_writes_only_mutable_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proddx.db");
    let db = Arc::new(Database::open(&path, DatabaseOptions::default()).unwrap());
    let store = SqliteCompanyStore::new(db);
    let company = Company::new(Uuid::new_v4(), "Acme", "a@acme.com");
    store.save(company.clone().into()).unwrap();

    store
        .save(proddx_core::CompanyDraft {
            id: company.id,
            account_id: Some(Uuid::new_v4()),
            email: Some("sales@acme.com".to_string()),
            created_at: Some(0),
            ..Default::default()
        })
        .unwrap();

    let conn = Connection::open(&path).unwrap();
    let (account_id, name, email, created_at): (String, String, String, i64) = conn
        .query_row(
            "SELECT account_id, name, email, created_at FROM companies WHERE id = ?1;",
            [company.id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!(account_id, company.account_id.to_string());
    assert_eq!(name, "Acme");
    assert_eq!(email, "sales@acme.com");
    assert_eq!(created_at, company.created_at);
    assert_eq!(count_rows(&conn, "companies"), 1);
}

#[test]
fn stores_sharing_a_database_see_each_other() {
    let db = database();
    let writer = SqliteReviewStore::new(Arc::clone(&db));
    let reader = SqliteReviewStore::new(db);

    let review = proddx_core::Review::new(Uuid::new_v4(), Uuid::new_v4(), "shared", 4);
    writer.save(review.clone().into()).unwrap();

    assert_eq!(reader.list(&ReviewFilter::default()).unwrap(), vec![review]);
}

#[test]
fn expired_deadline_fails_with_deadline_exceeded() {
    let store = SqliteCompanyStore::new(database());
    let expired = store.with_deadline(Instant::now() - Duration::from_millis(1));

    let err = expired
        .save(Company::new(Uuid::new_v4(), "Late", "late@x.com").into())
        .unwrap_err();
    assert!(matches!(err, StoreError::Db(DbError::DeadlineExceeded)));
    assert!(!err.is_not_found());

    assert!(store.list().unwrap().is_empty());
}

#[test]
fn storage_bundle_deadline_applies_to_every_store() {
    let storage = Storage::sqlite(database());
    let company = Company::new(Uuid::new_v4(), "Acme", "a@acme.com");
    storage.companies.save(company.clone().into()).unwrap();

    let expired = storage.with_deadline(Instant::now() - Duration::from_millis(1));
    assert!(matches!(
        expired.companies.find(&company.id.to_string()),
        Err(StoreError::Db(DbError::DeadlineExceeded))
    ));
    assert!(matches!(
        expired.products.list(&ProductFilter::default()),
        Err(StoreError::Db(DbError::DeadlineExceeded))
    ));
    assert_eq!(expired.backend(), "sqlite");

    let scoped = storage.with_timeout(Duration::from_secs(30));
    assert_eq!(scoped.companies.find(&company.id.to_string()).unwrap(), company);
    assert_eq!(storage.companies.find(&company.id.to_string()).unwrap(), company);
}

#[test]
fn generous_timeout_does_not_interfere() {
    let store = SqliteCompanyStore::new(database()).with_timeout(Duration::from_secs(30));
    let company = Company::new(Uuid::new_v4(), "On time", "ok@x.com");

    store.save(company.clone().into()).unwrap();
    assert_eq!(store.find(&company.account_id.to_string()).unwrap(), company);
}

#[test]
fn corrupted_uuid_is_reported_as_invalid_data() {
    let conn = open_db_in_memory(Duration::from_secs(1)).unwrap();
    conn.execute(
        "INSERT INTO products (id, company_id, name, feedback_url, rating, created_at)
         VALUES ('7b0c1f4e-3c1a-4d5e-9f00-000000000001', 'not-a-uuid', 'Broken', '', 0, 0);",
        [],
    )
    .unwrap();
    let store = SqliteProductStore::new(Arc::new(
        Database::from_connection(conn, DatabaseOptions::default()).unwrap(),
    ));

    let err = store
        .find("7b0c1f4e-3c1a-4d5e-9f00-000000000001")
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(message) if message.contains("products.company_id")));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();

    let err = Database::from_connection(conn, DatabaseOptions::default())
        .err()
        .unwrap();
    match err {
        DbError::UninitializedConnection {
            expected_version,
            actual_version,
        } => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn file_database_keeps_records_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proddx.db");
    let product = Product::new(Uuid::new_v4(), "Durable");

    {
        let db = Arc::new(Database::open(&path, DatabaseOptions::default()).unwrap());
        SqliteProductStore::new(db)
            .save(product.clone().into())
            .unwrap();
    }

    let db = Arc::new(Database::open(&path, DatabaseOptions::default()).unwrap());
    let found = SqliteProductStore::new(db)
        .find(&product.id.to_string())
        .unwrap();
    assert_eq!(found, product);
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT count(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
