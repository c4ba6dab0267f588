//! Product record.
//!
//! # Invariants
//! - `company_id` is fixed at creation.
//! - New products start with a zero rating and a feedback URL derived from
//!   their id (`FEEDBACK_URL_BASE/<id>`).

use super::company::CompanyId;
use super::{
    now_epoch_ms, replace_if_supplied, required_id, Draft, MissingField, Record, RecordKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProductId = Uuid;

/// Public host collecting reviews for a product.
pub const FEEDBACK_URL_BASE: &str = "https://review.proddx.com";

/// Returns the feedback collection URL for a product id.
pub fn feedback_url_for(id: ProductId) -> String {
    format!("{FEEDBACK_URL_BASE}/{id}")
}

/// Offering of a company that reviews are collected for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub company_id: CompanyId,
    pub name: String,
    pub feedback_url: String,
    /// Aggregate rating.
    pub rating: u32,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Product {
    /// Creates an unrated product with a fresh id and derived feedback URL.
    pub fn new(company_id: CompanyId, name: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            company_id,
            name: name.into(),
            feedback_url: feedback_url_for(id),
            rating: 0,
            created_at: now_epoch_ms(),
        }
    }
}

/// Upsert input for products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub id: ProductId,
    /// Only used on insert.
    pub company_id: Option<CompanyId>,
    pub name: Option<String>,
    pub feedback_url: Option<String>,
    pub rating: Option<u32>,
    /// Only used on insert.
    pub created_at: Option<i64>,
}

impl From<Product> for ProductDraft {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            company_id: Some(value.company_id),
            name: Some(value.name),
            feedback_url: Some(value.feedback_url),
            rating: Some(value.rating),
            created_at: Some(value.created_at),
        }
    }
}

impl Record for Product {
    type Draft = ProductDraft;

    const KIND: RecordKind = RecordKind::Product;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Draft for ProductDraft {
    type Record = Product;

    fn id(&self) -> Uuid {
        self.id
    }

    fn into_record(self) -> Result<Product, MissingField> {
        Ok(Product {
            id: self.id,
            company_id: required_id(self.company_id, RecordKind::Product, "company_id")?,
            name: self.name.unwrap_or_default(),
            feedback_url: self.feedback_url.unwrap_or_default(),
            rating: self.rating.unwrap_or(0),
            created_at: self.created_at.unwrap_or_else(now_epoch_ms),
        })
    }

    fn merge_into(self, stored: &mut Product) {
        replace_if_supplied(&mut stored.name, self.name);
        replace_if_supplied(&mut stored.feedback_url, self.feedback_url);
        replace_if_supplied(&mut stored.rating, self.rating);
    }
}

#[cfg(test)]
mod tests {
    use super::{feedback_url_for, Product, ProductDraft};
    use crate::model::Draft;
    use uuid::Uuid;

    #[test]
    fn new_product_derives_feedback_url_from_id() {
        let product = Product::new(Uuid::new_v4(), "Widget");
        assert_eq!(product.rating, 0);
        assert_eq!(
            product.feedback_url,
            format!("https://review.proddx.com/{}", product.id)
        );
        assert_eq!(product.feedback_url, feedback_url_for(product.id));
    }

    #[test]
    fn explicit_zero_rating_overwrites_stored_rating() {
        let mut stored = Product::new(Uuid::new_v4(), "Widget");
        stored.rating = 5;

        ProductDraft {
            id: stored.id,
            rating: Some(0),
            ..ProductDraft::default()
        }
        .merge_into(&mut stored);

        assert_eq!(stored.rating, 0);
        assert_eq!(stored.name, "Widget");
    }
}
