//! Record types persisted by the storage layer.
//!
//! # Responsibility
//! - Define the four record kinds and their stable identifiers.
//! - Define upsert drafts that make "field not supplied" explicit.
//!
//! # Invariants
//! - Identifiers are chosen before the first save and never change.
//! - `created_at` is written once, on insert, and survives every later save.
//! - Merging a draft only touches the mutable fields of its kind.
//! - Inserting a draft requires its immutable references; a nil UUID counts
//!   as missing.

use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub mod account;
pub mod company;
pub mod product;
pub mod review;

/// The four record kinds handled by the storage contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Account,
    Company,
    Product,
    Review,
}

impl RecordKind {
    /// Singular lowercase name used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Company => "company",
            Self::Product => "product",
            Self::Review => "review",
        }
    }

    /// Relational table holding this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Company => "companies",
            Self::Product => "products",
            Self::Review => "reviews",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored record shape shared by both storage backends.
pub trait Record: Clone + Send + 'static {
    /// Upsert input for this record kind.
    type Draft: Draft<Record = Self>;

    const KIND: RecordKind;

    fn id(&self) -> Uuid;

    /// Canonical alternate lookup key, for kinds that define one.
    fn alternate_key(&self) -> Option<String> {
        None
    }
}

/// Upsert input: a primary identifier plus optionally supplied fields.
///
/// `None` always means "not supplied"; zero and empty values are real values.
pub trait Draft: Clone {
    type Record;

    fn id(&self) -> Uuid;

    /// Builds the record inserted when no record with this id exists.
    ///
    /// Unsupplied strings become empty, unsupplied ratings become zero and an
    /// unsupplied `created_at` becomes the current time. Fails when a field
    /// fixed at creation (owner, parent references, login) is not supplied.
    fn into_record(self) -> Result<Self::Record, MissingField>;

    /// Overwrites the mutable fields of `stored` that this draft supplies.
    fn merge_into(self, stored: &mut Self::Record);
}

/// Required field absent from a draft or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField {
    pub kind: RecordKind,
    pub field: &'static str,
}

impl Display for MissingField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} is required", self.kind, self.field)
    }
}

impl std::error::Error for MissingField {}

/// Current wall clock as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

pub(crate) fn replace_if_supplied<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Unwraps a reference that must point at another record.
pub(crate) fn required_id(
    value: Option<Uuid>,
    kind: RecordKind,
    field: &'static str,
) -> Result<Uuid, MissingField> {
    value
        .filter(|id| !id.is_nil())
        .ok_or(MissingField { kind, field })
}

/// Unwraps a text field that must be present and non-empty.
pub(crate) fn required_text(
    value: Option<String>,
    kind: RecordKind,
    field: &'static str,
) -> Result<String, MissingField> {
    value
        .filter(|text| !text.is_empty())
        .ok_or(MissingField { kind, field })
}
