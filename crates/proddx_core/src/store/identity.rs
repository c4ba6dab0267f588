//! Primary/alternate key resolution shared by every backend.
//!
//! # Invariants
//! - The primary identifier is always tried first.
//! - Only accounts (`login`) and companies (`account_id`) have an alternate key.
//! - A key that yields neither a primary nor an alternate candidate matches
//!   nothing, without touching storage.

use crate::model::{Record, RecordKind};
use uuid::Uuid;

/// Column used as the alternate lookup key of a record kind.
pub fn alternate_column(kind: RecordKind) -> Option<&'static str> {
    match kind {
        RecordKind::Account => Some("login"),
        RecordKind::Company => Some("account_id"),
        RecordKind::Product | RecordKind::Review => None,
    }
}

/// Caller-supplied lookup key resolved into match candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    primary: Option<Uuid>,
    alternate: Option<String>,
}

impl LookupKey {
    pub fn parse(raw: &str, kind: RecordKind) -> Self {
        let primary = Uuid::parse_str(raw.trim()).ok();
        let alternate = match kind {
            RecordKind::Account if !raw.is_empty() => Some(raw.to_string()),
            // Owning-account references are stored in canonical UUID form.
            RecordKind::Company => primary.map(|id| id.to_string()),
            _ => None,
        };
        Self { primary, alternate }
    }

    pub fn primary(&self) -> Option<Uuid> {
        self.primary
    }

    pub fn alternate(&self) -> Option<&str> {
        self.alternate.as_deref()
    }

    /// Canonical text form of the primary candidate, as stored in `id` columns.
    pub fn primary_param(&self) -> Option<String> {
        self.primary.map(|id| id.to_string())
    }

    pub fn is_unresolvable(&self) -> bool {
        self.primary.is_none() && self.alternate.is_none()
    }

    /// Position of the matching record: a primary match anywhere wins over an
    /// alternate match.
    pub fn position_in<R: Record>(&self, records: &[R]) -> Option<usize> {
        let by_primary = self
            .primary
            .and_then(|id| records.iter().position(|record| record.id() == id));
        by_primary.or_else(|| {
            let alternate = self.alternate.as_deref()?;
            records
                .iter()
                .position(|record| record.alternate_key().as_deref() == Some(alternate))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{alternate_column, LookupKey};
    use crate::model::account::Account;
    use crate::model::company::Company;
    use crate::model::RecordKind;
    use uuid::Uuid;

    #[test]
    fn product_keys_have_no_alternate() {
        let key = LookupKey::parse("widget", RecordKind::Product);
        assert!(key.is_unresolvable());
        assert_eq!(alternate_column(RecordKind::Product), None);
    }

    #[test]
    fn company_alternate_is_canonical_account_id() {
        let account_id = Uuid::new_v4();
        let raw = account_id.to_string().to_uppercase();
        let key = LookupKey::parse(&raw, RecordKind::Company);
        assert_eq!(key.primary(), Some(account_id));
        assert_eq!(key.alternate(), Some(account_id.to_string().as_str()));
    }

    #[test]
    fn account_login_resolves_through_second_pass() {
        let first = Account::new("a@acme.com", "hash-a");
        let second = Account::new("b@acme.com", "hash-b");
        let records = vec![first, second.clone()];

        let key = LookupKey::parse("b@acme.com", RecordKind::Account);
        assert_eq!(key.position_in(&records), Some(1));

        let key = LookupKey::parse(&second.id.to_string(), RecordKind::Account);
        assert_eq!(key.position_in(&records), Some(1));
    }

    #[test]
    fn primary_match_wins_over_earlier_alternate_match() {
        let shared = Uuid::new_v4();
        let mut owned_by_shared = Company::new(shared, "Owner match", "o@x.com");
        owned_by_shared.id = Uuid::new_v4();
        let mut primary = Company::new(Uuid::new_v4(), "Primary match", "p@x.com");
        primary.id = shared;
        let records = vec![owned_by_shared, primary];

        let key = LookupKey::parse(&shared.to_string(), RecordKind::Company);
        assert_eq!(key.position_in(&records), Some(1));
    }
}
