//! Catalog use-case service.
//!
//! # Responsibility
//! - Create accounts with their company, products and reviews with the
//!   identifiers, timestamps and derived fields request handlers expect.
//! - Resolve a company from its owning account's id or login.
//!
//! # Invariants
//! - Required inputs are checked before any store call; a missing one is
//!   `StoreError::MissingField`. Empty text, nil ids and a zero review
//!   rating count as missing.
//! - Identifiers are minted here, before the store is called.
//! - Credential hashing happens outside the core; only hashes arrive here.

use crate::model::account::{Account, AccountDraft};
use crate::model::company::{Company, CompanyDraft, CompanyId};
use crate::model::product::{Product, ProductId};
use crate::model::review::Review;
use crate::model::{MissingField, RecordKind};
use crate::store::{ProductFilter, ReviewFilter, Storage, StoreError, StoreResult};
use log::{info, warn};
use uuid::Uuid;

/// Account and company created together by `register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub account: Account,
    pub company: Company,
}

/// Input for `submit_review`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    pub company_id: CompanyId,
    pub product_id: ProductId,
    pub comment: String,
    pub rating: u32,
}

/// Number of stored records per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub accounts: usize,
    pub companies: usize,
    pub products: usize,
    pub reviews: usize,
}

pub struct CatalogService {
    storage: Storage,
}

impl CatalogService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Creates an account and the company it owns.
    ///
    /// The company contact address starts as the login. A failure saving the
    /// company leaves the account in place; there is no cross-store rollback.
    pub fn register(
        &self,
        login: &str,
        password_hash: &str,
        company_name: &str,
    ) -> StoreResult<Registration> {
        require_text(RecordKind::Account, "login", login)?;
        require_text(RecordKind::Account, "password_hash", password_hash)?;
        require_text(RecordKind::Company, "name", company_name)?;

        let account = self
            .storage
            .accounts
            .save(AccountDraft::from(Account::new(login, password_hash)))?;
        let company = self
            .storage
            .companies
            .save(CompanyDraft::from(Company::new(account.id, company_name, login)))?;

        info!(
            "event=account_registered module=service status=ok account_id={} company_id={}",
            account.id, company.id
        );
        Ok(Registration { account, company })
    }

    /// Looks up the company owned by an account given its id or login.
    pub fn company_for_account(&self, account_key: &str) -> StoreResult<Company> {
        let account = self.storage.accounts.find(account_key)?;
        self.storage.companies.find(&account.id.to_string())
    }

    /// Creates an unrated product with a feedback URL derived from its id.
    pub fn create_product(&self, company_id: CompanyId, name: &str) -> StoreResult<Product> {
        require_id(RecordKind::Product, "company_id", company_id)?;
        require_text(RecordKind::Product, "name", name)?;

        self.storage
            .products
            .save(Product::new(company_id, name).into())
    }

    pub fn submit_review(&self, request: &ReviewRequest) -> StoreResult<Review> {
        require_id(RecordKind::Review, "company_id", request.company_id)?;
        require_id(RecordKind::Review, "product_id", request.product_id)?;
        require_text(RecordKind::Review, "comment", &request.comment)?;
        if request.rating == 0 {
            return Err(rejected(RecordKind::Review, "rating"));
        }

        let review = Review::new(
            request.company_id,
            request.product_id,
            request.comment.as_str(),
            request.rating,
        );
        self.storage.reviews.save(review.into())
    }

    /// Counts records per kind, treating an empty in-memory collection as zero.
    pub fn record_counts(&self) -> StoreResult<RecordCounts> {
        Ok(RecordCounts {
            accounts: count(self.storage.accounts.list())?,
            companies: count(self.storage.companies.list())?,
            products: count(self.storage.products.list(&ProductFilter::default()))?,
            reviews: count(self.storage.reviews.list(&ReviewFilter::default()))?,
        })
    }
}

fn require_text(kind: RecordKind, field: &'static str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(rejected(kind, field));
    }
    Ok(())
}

fn require_id(kind: RecordKind, field: &'static str, value: Uuid) -> StoreResult<()> {
    if value.is_nil() {
        return Err(rejected(kind, field));
    }
    Ok(())
}

fn rejected(kind: RecordKind, field: &'static str) -> StoreError {
    warn!("event=input_rejected module=service status=error kind={kind} field={field}");
    MissingField { kind, field }.into()
}

fn count<T>(listed: StoreResult<Vec<T>>) -> StoreResult<usize> {
    match listed {
        Ok(records) => Ok(records.len()),
        Err(StoreError::EmptyCollection { .. }) => Ok(0),
        Err(err) => Err(err),
    }
}

impl RecordCounts {
    pub fn get(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Account => self.accounts,
            RecordKind::Company => self.companies,
            RecordKind::Product => self.products,
            RecordKind::Review => self.reviews,
        }
    }
}
