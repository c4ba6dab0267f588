use super::{parse_uuid, SqlRecord, SqliteStore};
use crate::model::company::{Company, CompanyDraft, CompanyId};
use crate::store::{CompanyStore, StoreResult};
use rusqlite::{params, Connection, Row};

impl SqlRecord for Company {
    const COLUMNS: &'static str = "id, account_id, name, email, logo, created_at";

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        Ok(Self {
            id: parse_uuid(row, "companies", "id")?,
            account_id: parse_uuid(row, "companies", "account_id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            logo: row.get("logo")?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO companies (id, account_id, name, email, logo, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                self.id.to_string(),
                self.account_id.to_string(),
                self.name.as_str(),
                self.email.as_str(),
                self.logo.as_str(),
                self.created_at,
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE companies SET name = ?2, email = ?3, logo = ?4 WHERE id = ?1;",
            params![
                self.id.to_string(),
                self.name.as_str(),
                self.email.as_str(),
                self.logo.as_str(),
            ],
        )
    }
}

impl CompanyStore for SqliteStore<Company> {
    fn save(&self, draft: CompanyDraft) -> StoreResult<Company> {
        self.upsert(draft)
    }

    fn list(&self) -> StoreResult<Vec<Company>> {
        self.list_where(Vec::new())
    }

    fn find(&self, key: &str) -> StoreResult<Company> {
        self.find_by_key(key)
    }

    fn delete(&self, id: CompanyId) -> StoreResult<()> {
        self.remove(id)
    }
}
