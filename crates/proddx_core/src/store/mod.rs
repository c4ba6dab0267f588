//! Storage contract shared by the in-memory and SQLite backends.
//!
//! # Responsibility
//! - Define one CRUD capability set per record kind.
//! - Bundle the four stores of one backend behind trait objects so callers
//!   pick a backend once, at construction time.
//!
//! # Invariants
//! - `save` is an upsert: a miss inserts, a hit merges supplied fields only.
//! - `find` tries the primary identifier before the alternate key.
//! - `delete` of a missing identifier is `StoreError::NotFound`.
//! - Backend failures are returned untouched; nothing is retried here.

use crate::config::{Backend, StorageConfig};
use crate::db::{Database, DbError};
use crate::model::account::{Account, AccountDraft, AccountId};
use crate::model::company::{Company, CompanyDraft, CompanyId};
use crate::model::product::{Product, ProductDraft, ProductId};
use crate::model::review::{Review, ReviewDraft, ReviewId};
use crate::model::{MissingField, RecordKind};
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub mod identity;
pub mod memory;
pub mod sqlite;

pub use memory::MemoryTable;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage error taxonomy.
#[derive(Debug)]
pub enum StoreError {
    /// No record matched the identifier (or alternate key).
    NotFound { kind: RecordKind, key: String },
    /// In-memory `list` produced no records.
    EmptyCollection { kind: RecordKind },
    /// Insert would duplicate a unique alternate key.
    DuplicateKey { kind: RecordKind, key: String },
    /// A required field or reference was absent, empty or nil.
    MissingField {
        kind: RecordKind,
        field: &'static str,
    },
    /// Backend unreachable, query failed or deadline exceeded.
    Db(DbError),
    /// A persisted row could not be decoded.
    InvalidData(String),
}

impl StoreError {
    pub fn not_found(kind: RecordKind, key: impl Display) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, key } => write!(f, "{kind} not found: {key}"),
            Self::EmptyCollection { kind } => write!(f, "no {} found", kind.table()),
            Self::DuplicateKey { kind, key } => write!(f, "{kind} key already in use: {key}"),
            Self::MissingField { kind, field } => write!(f, "{kind} {field} is required"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::EmptyCollection { .. }
            | Self::DuplicateKey { .. }
            | Self::MissingField { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<MissingField> for StoreError {
    fn from(value: MissingField) -> Self {
        Self::MissingField {
            kind: value.kind,
            field: value.field,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(value.into())
    }
}

/// Equality filters for listing products. `None` leaves a column unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub company_id: Option<CompanyId>,
}

impl ProductFilter {
    pub fn for_company(company_id: CompanyId) -> Self {
        Self {
            company_id: Some(company_id),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.company_id.map_or(true, |id| product.company_id == id)
    }

    pub(crate) fn bindings(&self) -> Vec<(&'static str, Value)> {
        self.company_id
            .map(|id| ("company_id", Value::Text(id.to_string())))
            .into_iter()
            .collect()
    }
}

/// Equality filters for listing reviews; supplied filters are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub company_id: Option<CompanyId>,
    pub product_id: Option<ProductId>,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        self.company_id.map_or(true, |id| review.company_id == id)
            && self.product_id.map_or(true, |id| review.product_id == id)
    }

    pub(crate) fn bindings(&self) -> Vec<(&'static str, Value)> {
        let mut bindings = Vec::new();
        if let Some(id) = self.company_id {
            bindings.push(("company_id", Value::Text(id.to_string())));
        }
        if let Some(id) = self.product_id {
            bindings.push(("product_id", Value::Text(id.to_string())));
        }
        bindings
    }
}

/// Account persistence contract. `find` also accepts a login.
pub trait AccountStore: Send + Sync {
    fn save(&self, draft: AccountDraft) -> StoreResult<Account>;
    fn list(&self) -> StoreResult<Vec<Account>>;
    fn find(&self, key: &str) -> StoreResult<Account>;
    fn delete(&self, id: AccountId) -> StoreResult<()>;
}

/// Company persistence contract. `find` also accepts the owning account id.
pub trait CompanyStore: Send + Sync {
    fn save(&self, draft: CompanyDraft) -> StoreResult<Company>;
    fn list(&self) -> StoreResult<Vec<Company>>;
    fn find(&self, key: &str) -> StoreResult<Company>;
    fn delete(&self, id: CompanyId) -> StoreResult<()>;
}

/// Product persistence contract.
pub trait ProductStore: Send + Sync {
    fn save(&self, draft: ProductDraft) -> StoreResult<Product>;
    fn list(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
    fn find(&self, key: &str) -> StoreResult<Product>;
    fn delete(&self, id: ProductId) -> StoreResult<()>;
}

/// Review persistence contract.
pub trait ReviewStore: Send + Sync {
    fn save(&self, draft: ReviewDraft) -> StoreResult<Review>;
    fn list(&self, filter: &ReviewFilter) -> StoreResult<Vec<Review>>;
    fn find(&self, key: &str) -> StoreResult<Review>;
    fn delete(&self, id: ReviewId) -> StoreResult<()>;
}

/// The four stores of one backend.
#[derive(Clone)]
pub struct Storage {
    pub accounts: Arc<dyn AccountStore>,
    pub companies: Arc<dyn CompanyStore>,
    pub products: Arc<dyn ProductStore>,
    pub reviews: Arc<dyn ReviewStore>,
    handle: BackendHandle,
}

#[derive(Clone)]
enum BackendHandle {
    Memory,
    Sqlite(Arc<Database>),
}

impl Storage {
    /// Process-local storage; contents are lost when the value is dropped.
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(MemoryTable::<Account>::new()),
            companies: Arc::new(MemoryTable::<Company>::new()),
            products: Arc::new(MemoryTable::<Product>::new()),
            reviews: Arc::new(MemoryTable::<Review>::new()),
            handle: BackendHandle::Memory,
        }
    }

    /// SQLite-backed storage sharing one connection handle.
    pub fn sqlite(db: Arc<Database>) -> Self {
        Self::sqlite_scoped(db, None)
    }

    fn sqlite_scoped(db: Arc<Database>, deadline: Option<Instant>) -> Self {
        fn store<R>(db: &Arc<Database>, deadline: Option<Instant>) -> SqliteStore<R> {
            let store = SqliteStore::new(Arc::clone(db));
            match deadline {
                Some(deadline) => store.with_deadline(deadline),
                None => store,
            }
        }

        Self {
            accounts: Arc::new(store::<Account>(&db, deadline)),
            companies: Arc::new(store::<Company>(&db, deadline)),
            products: Arc::new(store::<Product>(&db, deadline)),
            reviews: Arc::new(store::<Review>(&db, deadline)),
            handle: BackendHandle::Sqlite(db),
        }
    }

    /// Copy of this bundle whose SQLite queries must finish before
    /// `deadline`. In-memory stores never wait on I/O and are shared as is.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        match &self.handle {
            BackendHandle::Memory => self.clone(),
            BackendHandle::Sqlite(db) => Self::sqlite_scoped(Arc::clone(db), Some(deadline)),
        }
    }

    /// Copy of this bundle whose SQLite queries must finish within `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Builds the backend selected by `config`, opening and migrating the
    /// database file for the SQLite backend.
    pub fn open(config: &StorageConfig) -> StoreResult<Self> {
        match &config.backend {
            Backend::Memory => Ok(Self::in_memory()),
            Backend::Sqlite { path } => {
                let db = Database::open(path, config.database_options())?;
                Ok(Self::sqlite(Arc::new(db)))
            }
        }
    }

    /// `memory` or `sqlite`.
    pub fn backend(&self) -> &'static str {
        match self.handle {
            BackendHandle::Memory => "memory",
            BackendHandle::Sqlite(_) => "sqlite",
        }
    }
}
