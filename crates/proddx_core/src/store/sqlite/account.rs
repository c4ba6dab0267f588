use super::{parse_uuid, SqlRecord, SqliteStore};
use crate::model::account::{Account, AccountDraft, AccountId};
use crate::store::{AccountStore, StoreResult};
use rusqlite::{params, Connection, Row};

impl SqlRecord for Account {
    const COLUMNS: &'static str = "id, login, password_hash, created_at";

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        Ok(Self {
            id: parse_uuid(row, "accounts", "id")?,
            login: row.get("login")?,
            password_hash: row.get("password_hash")?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO accounts (id, login, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                self.id.to_string(),
                self.login.as_str(),
                self.password_hash.as_str(),
                self.created_at,
            ],
        )
    }

    // Accounts have no mutable columns.
    fn update(&self, _conn: &Connection) -> rusqlite::Result<usize> {
        Ok(0)
    }
}

impl AccountStore for SqliteStore<Account> {
    fn save(&self, draft: AccountDraft) -> StoreResult<Account> {
        self.upsert(draft)
    }

    fn list(&self) -> StoreResult<Vec<Account>> {
        self.list_where(Vec::new())
    }

    fn find(&self, key: &str) -> StoreResult<Account> {
        self.find_by_key(key)
    }

    fn delete(&self, id: AccountId) -> StoreResult<()> {
        self.remove(id)
    }
}
