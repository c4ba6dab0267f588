use super::{parse_uuid, SqlRecord, SqliteStore};
use crate::model::product::{Product, ProductDraft, ProductId};
use crate::store::{ProductFilter, ProductStore, StoreResult};
use rusqlite::{params, Connection, Row};

impl SqlRecord for Product {
    const COLUMNS: &'static str = "id, company_id, name, feedback_url, rating, created_at";

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        Ok(Self {
            id: parse_uuid(row, "products", "id")?,
            company_id: parse_uuid(row, "products", "company_id")?,
            name: row.get("name")?,
            feedback_url: row.get("feedback_url")?,
            rating: row.get("rating")?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO products (id, company_id, name, feedback_url, rating, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                self.id.to_string(),
                self.company_id.to_string(),
                self.name.as_str(),
                self.feedback_url.as_str(),
                self.rating,
                self.created_at,
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE products SET name = ?2, feedback_url = ?3, rating = ?4 WHERE id = ?1;",
            params![
                self.id.to_string(),
                self.name.as_str(),
                self.feedback_url.as_str(),
                self.rating,
            ],
        )
    }
}

impl ProductStore for SqliteStore<Product> {
    fn save(&self, draft: ProductDraft) -> StoreResult<Product> {
        self.upsert(draft)
    }

    fn list(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        self.list_where(filter.bindings())
    }

    fn find(&self, key: &str) -> StoreResult<Product> {
        self.find_by_key(key)
    }

    fn delete(&self, id: ProductId) -> StoreResult<()> {
        self.remove(id)
    }
}
