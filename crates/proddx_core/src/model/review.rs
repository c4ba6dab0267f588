//! Review record.
//!
//! # Invariants
//! - `company_id` and `product_id` are both required at creation and never
//!   change afterwards.

use super::company::CompanyId;
use super::product::ProductId;
use super::{
    now_epoch_ms, replace_if_supplied, required_id, Draft, MissingField, Record, RecordKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ReviewId = Uuid;

/// Feedback left on one product of one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub company_id: CompanyId,
    pub product_id: ProductId,
    pub comment: String,
    pub rating: u32,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Review {
    pub fn new(
        company_id: CompanyId,
        product_id: ProductId,
        comment: impl Into<String>,
        rating: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            product_id,
            comment: comment.into(),
            rating,
            created_at: now_epoch_ms(),
        }
    }
}

/// Upsert input for reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewDraft {
    pub id: ReviewId,
    /// Only used on insert.
    pub company_id: Option<CompanyId>,
    /// Only used on insert.
    pub product_id: Option<ProductId>,
    pub comment: Option<String>,
    pub rating: Option<u32>,
    /// Only used on insert.
    pub created_at: Option<i64>,
}

impl From<Review> for ReviewDraft {
    fn from(value: Review) -> Self {
        Self {
            id: value.id,
            company_id: Some(value.company_id),
            product_id: Some(value.product_id),
            comment: Some(value.comment),
            rating: Some(value.rating),
            created_at: Some(value.created_at),
        }
    }
}

impl Record for Review {
    type Draft = ReviewDraft;

    const KIND: RecordKind = RecordKind::Review;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Draft for ReviewDraft {
    type Record = Review;

    fn id(&self) -> Uuid {
        self.id
    }

    fn into_record(self) -> Result<Review, MissingField> {
        Ok(Review {
            id: self.id,
            company_id: required_id(self.company_id, RecordKind::Review, "company_id")?,
            product_id: required_id(self.product_id, RecordKind::Review, "product_id")?,
            comment: self.comment.unwrap_or_default(),
            rating: self.rating.unwrap_or(0),
            created_at: self.created_at.unwrap_or_else(now_epoch_ms),
        })
    }

    fn merge_into(self, stored: &mut Review) {
        replace_if_supplied(&mut stored.comment, self.comment);
        replace_if_supplied(&mut stored.rating, self.rating);
    }
}
