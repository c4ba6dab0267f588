//! Account record.
//!
//! # Invariants
//! - `login` is unique across accounts and doubles as the alternate lookup key.
//! - Accounts are created, found and deleted; saves never modify them.

use super::{now_epoch_ms, required_text, Draft, MissingField, Record, RecordKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AccountId = Uuid;

/// Login credentials owned by one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Login identifier, usually an email address.
    pub login: String,
    /// Credential hash computed by the caller; never a raw password.
    pub password_hash: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Account {
    /// Creates an account with a fresh id stamped with the current time.
    pub fn new(login: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            login: login.into(),
            password_hash: password_hash.into(),
            created_at: now_epoch_ms(),
        }
    }
}

/// Upsert input for accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountDraft {
    pub id: AccountId,
    pub login: Option<String>,
    pub password_hash: Option<String>,
    pub created_at: Option<i64>,
}

impl From<Account> for AccountDraft {
    fn from(value: Account) -> Self {
        Self {
            id: value.id,
            login: Some(value.login),
            password_hash: Some(value.password_hash),
            created_at: Some(value.created_at),
        }
    }
}

impl Record for Account {
    type Draft = AccountDraft;

    const KIND: RecordKind = RecordKind::Account;

    fn id(&self) -> Uuid {
        self.id
    }

    fn alternate_key(&self) -> Option<String> {
        Some(self.login.clone())
    }
}

impl Draft for AccountDraft {
    type Record = Account;

    fn id(&self) -> Uuid {
        self.id
    }

    fn into_record(self) -> Result<Account, MissingField> {
        Ok(Account {
            id: self.id,
            login: required_text(self.login, RecordKind::Account, "login")?,
            password_hash: self.password_hash.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_else(now_epoch_ms),
        })
    }

    // No account field is mutable after creation.
    fn merge_into(self, _stored: &mut Account) {}
}
