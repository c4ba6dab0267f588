//! Process-local storage backend.
//!
//! # Responsibility
//! - Keep one ordered sequence of records per kind.
//! - Implement the storage contract with linear scans.
//!
//! # Invariants
//! - One mutex per kind is held for the whole of every operation.
//! - `delete` swaps the last record into the freed slot, so order after a
//!   delete is not preserved.
//! - `list` reports an empty result as `StoreError::EmptyCollection`.
//! - Alternate keys stay unique, mirroring the SQLite `UNIQUE` constraints.

use super::identity::LookupKey;
use super::{
    AccountStore, CompanyStore, ProductFilter, ProductStore, ReviewFilter, ReviewStore,
    StoreError, StoreResult,
};
use crate::model::account::{Account, AccountDraft, AccountId};
use crate::model::company::{Company, CompanyDraft, CompanyId};
use crate::model::product::{Product, ProductDraft, ProductId};
use crate::model::review::{Review, ReviewDraft, ReviewId};
use crate::model::{Draft, Record};
use log::debug;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// In-memory sequence of one record kind.
pub struct MemoryTable<R> {
    rows: Mutex<Vec<R>>,
}

pub type MemoryAccountStore = MemoryTable<Account>;
pub type MemoryCompanyStore = MemoryTable<Company>;
pub type MemoryProductStore = MemoryTable<Product>;
pub type MemoryReviewStore = MemoryTable<Review>;

impl<R> Default for MemoryTable<R> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }
}

impl<R: Record> MemoryTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    fn rows(&self) -> MutexGuard<'_, Vec<R>> {
        // Mutations are single Vec operations; a poisoned lock still guards
        // a consistent sequence.
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn upsert(&self, draft: R::Draft) -> StoreResult<R> {
        let mut rows = self.rows();
        let id = draft.id();

        if let Some(stored) = rows.iter_mut().find(|record| record.id() == id) {
            draft.merge_into(stored);
            debug!(
                "event=store_save module=store backend=memory kind={} id={} outcome=update",
                R::KIND,
                id
            );
            return Ok(stored.clone());
        }

        let record = draft.into_record()?;
        if let Some(key) = record.alternate_key() {
            if rows
                .iter()
                .any(|existing| existing.alternate_key().as_deref() == Some(key.as_str()))
            {
                return Err(StoreError::DuplicateKey { kind: R::KIND, key });
            }
        }
        rows.push(record.clone());
        debug!(
            "event=store_save module=store backend=memory kind={} id={} outcome=insert",
            R::KIND,
            id
        );
        Ok(record)
    }

    fn list_where(&self, predicate: impl Fn(&R) -> bool) -> StoreResult<Vec<R>> {
        let records: Vec<R> = self
            .rows()
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect();
        if records.is_empty() {
            return Err(StoreError::EmptyCollection { kind: R::KIND });
        }
        Ok(records)
    }

    fn find_by_key(&self, raw: &str) -> StoreResult<R> {
        let key = LookupKey::parse(raw, R::KIND);
        let rows = self.rows();
        key.position_in(rows.as_slice())
            .and_then(|index| rows.get(index).cloned())
            .ok_or_else(|| StoreError::not_found(R::KIND, raw))
    }

    fn remove(&self, id: Uuid) -> StoreResult<()> {
        let mut rows = self.rows();
        let index = rows
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found(R::KIND, id))?;
        rows.swap_remove(index);
        debug!(
            "event=store_delete module=store backend=memory kind={} id={}",
            R::KIND,
            id
        );
        Ok(())
    }
}

impl AccountStore for MemoryTable<Account> {
    fn save(&self, draft: AccountDraft) -> StoreResult<Account> {
        self.upsert(draft)
    }

    fn list(&self) -> StoreResult<Vec<Account>> {
        self.list_where(|_| true)
    }

    fn find(&self, key: &str) -> StoreResult<Account> {
        self.find_by_key(key)
    }

    fn delete(&self, id: AccountId) -> StoreResult<()> {
        self.remove(id)
    }
}

impl CompanyStore for MemoryTable<Company> {
    fn save(&self, draft: CompanyDraft) -> StoreResult<Company> {
        self.upsert(draft)
    }

    fn list(&self) -> StoreResult<Vec<Company>> {
        self.list_where(|_| true)
    }

    fn find(&self, key: &str) -> StoreResult<Company> {
        self.find_by_key(key)
    }

    fn delete(&self, id: CompanyId) -> StoreResult<()> {
        self.remove(id)
    }
}

impl ProductStore for MemoryTable<Product> {
    fn save(&self, draft: ProductDraft) -> StoreResult<Product> {
        self.upsert(draft)
    }

    fn list(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        self.list_where(|product| filter.matches(product))
    }

    fn find(&self, key: &str) -> StoreResult<Product> {
        self.find_by_key(key)
    }

    fn delete(&self, id: ProductId) -> StoreResult<()> {
        self.remove(id)
    }
}

impl ReviewStore for MemoryTable<Review> {
    fn save(&self, draft: ReviewDraft) -> StoreResult<Review> {
        self.upsert(draft)
    }

    fn list(&self, filter: &ReviewFilter) -> StoreResult<Vec<Review>> {
        self.list_where(|review| filter.matches(review))
    }

    fn find(&self, key: &str) -> StoreResult<Review> {
        self.find_by_key(key)
    }

    fn delete(&self, id: ReviewId) -> StoreResult<()> {
        self.remove(id)
    }
}
