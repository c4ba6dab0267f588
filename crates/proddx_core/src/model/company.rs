//! Company record.
//!
//! # Invariants
//! - `account_id` is fixed at creation and is unique across companies, so it
//!   works as an alternate lookup key ("the company of account X").
//! - `name`, `email` and `logo` are the only fields a save may change.

use super::account::AccountId;
use super::{
    now_epoch_ms, replace_if_supplied, required_id, Draft, MissingField, Record, RecordKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CompanyId = Uuid;

/// Organization owning products and receiving reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    /// Owning account.
    pub account_id: AccountId,
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Logo URL, empty when none was uploaded.
    pub logo: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Company {
    /// Creates a company without a logo, with a fresh id and current timestamp.
    pub fn new(account_id: AccountId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            name: name.into(),
            email: email.into(),
            logo: String::new(),
            created_at: now_epoch_ms(),
        }
    }
}

/// Upsert input for companies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyDraft {
    pub id: CompanyId,
    /// Only used on insert.
    pub account_id: Option<AccountId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub logo: Option<String>,
    /// Only used on insert.
    pub created_at: Option<i64>,
}

impl From<Company> for CompanyDraft {
    fn from(value: Company) -> Self {
        Self {
            id: value.id,
            account_id: Some(value.account_id),
            name: Some(value.name),
            email: Some(value.email),
            logo: Some(value.logo),
            created_at: Some(value.created_at),
        }
    }
}

impl Record for Company {
    type Draft = CompanyDraft;

    const KIND: RecordKind = RecordKind::Company;

    fn id(&self) -> Uuid {
        self.id
    }

    fn alternate_key(&self) -> Option<String> {
        Some(self.account_id.to_string())
    }
}

impl Draft for CompanyDraft {
    type Record = Company;

    fn id(&self) -> Uuid {
        self.id
    }

    fn into_record(self) -> Result<Company, MissingField> {
        Ok(Company {
            id: self.id,
            account_id: required_id(self.account_id, RecordKind::Company, "account_id")?,
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            logo: self.logo.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_else(now_epoch_ms),
        })
    }

    fn merge_into(self, stored: &mut Company) {
        replace_if_supplied(&mut stored.name, self.name);
        replace_if_supplied(&mut stored.email, self.email);
        replace_if_supplied(&mut stored.logo, self.logo);
    }
}

#[cfg(test)]
mod tests {
    use super::{Company, CompanyDraft};
    use crate::model::Draft;
    use uuid::Uuid;

    #[test]
    fn merge_ignores_owner_and_creation_time() {
        let mut stored = Company::new(Uuid::new_v4(), "Acme", "a@acme.com");
        let original = stored.clone();

        CompanyDraft {
            id: stored.id,
            account_id: Some(Uuid::new_v4()),
            logo: Some("http://x/logo.png".to_string()),
            created_at: Some(1),
            ..CompanyDraft::default()
        }
        .merge_into(&mut stored);

        assert_eq!(stored.account_id, original.account_id);
        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(stored.name, "Acme");
        assert_eq!(stored.logo, "http://x/logo.png");
    }
}
