use super::{parse_uuid, SqlRecord, SqliteStore};
use crate::model::review::{Review, ReviewDraft, ReviewId};
use crate::store::{ReviewFilter, ReviewStore, StoreResult};
use rusqlite::{params, Connection, Row};

impl SqlRecord for Review {
    const COLUMNS: &'static str = "id, company_id, product_id, comment, rating, created_at";

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        Ok(Self {
            id: parse_uuid(row, "reviews", "id")?,
            company_id: parse_uuid(row, "reviews", "company_id")?,
            product_id: parse_uuid(row, "reviews", "product_id")?,
            comment: row.get("comment")?,
            rating: row.get("rating")?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO reviews (id, company_id, product_id, comment, rating, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                self.id.to_string(),
                self.company_id.to_string(),
                self.product_id.to_string(),
                self.comment.as_str(),
                self.rating,
                self.created_at,
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE reviews SET comment = ?2, rating = ?3 WHERE id = ?1;",
            params![self.id.to_string(), self.comment.as_str(), self.rating],
        )
    }
}

impl ReviewStore for SqliteStore<Review> {
    fn save(&self, draft: ReviewDraft) -> StoreResult<Review> {
        self.upsert(draft)
    }

    fn list(&self, filter: &ReviewFilter) -> StoreResult<Vec<Review>> {
        self.list_where(filter.bindings())
    }

    fn find(&self, key: &str) -> StoreResult<Review> {
        self.find_by_key(key)
    }

    fn delete(&self, id: ReviewId) -> StoreResult<()> {
        self.remove(id)
    }
}
