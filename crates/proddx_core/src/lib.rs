//! Persistence core for the Proddx review platform.
//!
//! Accounts, companies, products and reviews are stored behind one storage
//! contract with two interchangeable backends: a process-local collection
//! and SQLite.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{Backend, ConfigError, StorageConfig};
pub use db::{Database, DatabaseOptions, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, AccountDraft, AccountId};
pub use model::company::{Company, CompanyDraft, CompanyId};
pub use model::product::{feedback_url_for, Product, ProductDraft, ProductId};
pub use model::review::{Review, ReviewDraft, ReviewId};
pub use model::{now_epoch_ms, MissingField, RecordKind};
pub use service::catalog_service::{CatalogService, RecordCounts, Registration, ReviewRequest};
pub use store::{
    AccountStore, CompanyStore, MemoryTable, ProductFilter, ProductStore, ReviewFilter,
    ReviewStore, SqliteStore, Storage, StoreError, StoreResult,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
