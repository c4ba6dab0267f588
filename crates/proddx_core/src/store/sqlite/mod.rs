//! SQLite storage backend.
//!
//! # Responsibility
//! - Implement the storage contract over the `accounts`, `companies`,
//!   `products` and `reviews` tables.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save` looks up by id, then inserts on a miss or updates only the kind's
//!   mutable columns on a hit. A primary-key violation on insert (another
//!   writer won the race) is applied as an update instead; if the row is
//!   gone again by then, the constraint error is returned as is.
//! - `find` matches id or alternate key in one statement, primary first.
//! - `delete` reports zero affected rows as `StoreError::NotFound`.
//! - `list` returns `Ok(vec![])` when nothing matches.
//! - Every operation runs under the store's deadline, if any.

use super::identity::{alternate_column, LookupKey};
use super::{StoreError, StoreResult};
use crate::db::Database;
use crate::model::account::Account;
use crate::model::company::Company;
use crate::model::product::Product;
use crate::model::review::Review;
use crate::model::{Draft, Record};
use log::{debug, error};
use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row, Rows};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

mod account;
mod company;
mod product;
mod review;

mod sealed {
    pub trait Sealed {}
}

impl sealed::Sealed for Account {}
impl sealed::Sealed for Company {}
impl sealed::Sealed for Product {}
impl sealed::Sealed for Review {}

/// Row mapping for one record kind. Implemented for the four record kinds
/// only.
pub trait SqlRecord: Record + sealed::Sealed {
    /// Column list shared by insert and scan statements, in that order.
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> StoreResult<Self>;

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize>;

    /// Writes the kind's mutable columns only.
    fn update(&self, conn: &Connection) -> rusqlite::Result<usize>;
}

/// SQLite-backed store of one record kind.
///
/// Clones share the connection; `with_deadline` returns a request-scoped
/// copy whose operations fail with `DbError::DeadlineExceeded` once the
/// deadline passes.
pub struct SqliteStore<R> {
    db: Arc<Database>,
    deadline: Option<Instant>,
    _record: PhantomData<fn() -> R>,
}

pub type SqliteAccountStore = SqliteStore<Account>;
pub type SqliteCompanyStore = SqliteStore<Company>;
pub type SqliteProductStore = SqliteStore<Product>;
pub type SqliteReviewStore = SqliteStore<Review>;

impl<R> Clone for SqliteStore<R> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            deadline: self.deadline,
            _record: PhantomData,
        }
    }
}

impl<R> SqliteStore<R> {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            deadline: None,
            _record: PhantomData,
        }
    }

    /// Copy of this store whose operations must finish before `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..self.clone()
        }
    }

    /// Copy of this store whose operations must finish within `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveOutcome {
    Inserted,
    Updated,
}

impl SaveOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "insert",
            Self::Updated => "update",
        }
    }
}

impl<R: SqlRecord> SqliteStore<R> {
    fn run<T>(&self, operation: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        self.db.with_connection(self.deadline, operation)
    }

    fn upsert(&self, draft: R::Draft) -> StoreResult<R> {
        let id = draft.id();
        match self.run(|conn| upsert_row::<R>(conn, draft)) {
            Ok((record, outcome)) => {
                debug!(
                    "event=store_save module=store backend=sqlite kind={} id={} outcome={}",
                    R::KIND,
                    id,
                    outcome.as_str()
                );
                Ok(record)
            }
            Err(err) => {
                error!(
                    "event=store_save module=store backend=sqlite status=error kind={} id={} error={}",
                    R::KIND,
                    id,
                    err
                );
                Err(err)
            }
        }
    }

    fn list_where(&self, bindings: Vec<(&'static str, Value)>) -> StoreResult<Vec<R>> {
        self.run(|conn| select_where::<R>(conn, bindings))
    }

    fn find_by_key(&self, raw: &str) -> StoreResult<R> {
        let key = LookupKey::parse(raw, R::KIND);
        if key.is_unresolvable() {
            return Err(StoreError::not_found(R::KIND, raw));
        }
        self.run(|conn| select_by_key::<R>(conn, &key))?
            .ok_or_else(|| StoreError::not_found(R::KIND, raw))
    }

    fn remove(&self, id: Uuid) -> StoreResult<()> {
        let changed = self.run(|conn| {
            let changed = conn.execute(
                &format!("DELETE FROM {} WHERE id = ?1;", R::KIND.table()),
                [id.to_string()],
            )?;
            Ok(changed)
        })?;

        if changed == 0 {
            return Err(StoreError::not_found(R::KIND, id));
        }
        debug!(
            "event=store_delete module=store backend=sqlite kind={} id={}",
            R::KIND,
            id
        );
        Ok(())
    }
}

fn upsert_row<R: SqlRecord>(conn: &Connection, draft: R::Draft) -> StoreResult<(R, SaveOutcome)> {
    let id = draft.id();
    if let Some(stored) = select_by_id::<R>(conn, id)? {
        return update_row(conn, stored, draft);
    }
    insert_row(conn, draft)
}

/// Inserts a record whose id was not found. A primary-key violation means
/// another writer inserted the id in between, so the draft is merged into
/// that row.
fn insert_row<R: SqlRecord>(
    conn: &Connection,
    draft: R::Draft,
) -> StoreResult<(R, SaveOutcome)> {
    let id = draft.id();
    let record = draft.clone().into_record()?;
    match record.insert(conn) {
        Ok(_) => Ok((record, SaveOutcome::Inserted)),
        Err(err) if constraint_code(&err) == Some(SQLITE_CONSTRAINT_PRIMARYKEY) => {
            match select_by_id::<R>(conn, id)? {
                Some(stored) => update_row(conn, stored, draft),
                None => Err(err.into()),
            }
        }
        Err(err) if constraint_code(&err) == Some(SQLITE_CONSTRAINT_UNIQUE) => {
            Err(StoreError::DuplicateKey {
                kind: R::KIND,
                key: record.alternate_key().unwrap_or_default(),
            })
        }
        Err(err) => Err(err.into()),
    }
}

fn update_row<R: SqlRecord>(
    conn: &Connection,
    mut stored: R,
    draft: R::Draft,
) -> StoreResult<(R, SaveOutcome)> {
    draft.merge_into(&mut stored);
    stored.update(conn)?;
    Ok((stored, SaveOutcome::Updated))
}

fn select_by_id<R: SqlRecord>(conn: &Connection, id: Uuid) -> StoreResult<Option<R>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} WHERE id = ?1;",
        R::COLUMNS,
        R::KIND.table()
    ))?;
    let mut rows = stmt.query([id.to_string()])?;
    first_record(&mut rows)
}

fn select_by_key<R: SqlRecord>(conn: &Connection, key: &LookupKey) -> StoreResult<Option<R>> {
    let columns = R::COLUMNS;
    let table = R::KIND.table();

    match alternate_column(R::KIND) {
        Some(alternate) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {columns} FROM {table}
                 WHERE id = ?1 OR {alternate} = ?2
                 ORDER BY CASE WHEN id = ?1 THEN 0 ELSE 1 END
                 LIMIT 1;"
            ))?;
            let mut rows = stmt.query(params![key.primary_param(), key.alternate()])?;
            first_record(&mut rows)
        }
        None => {
            let mut stmt =
                conn.prepare(&format!("SELECT {columns} FROM {table} WHERE id = ?1;"))?;
            let mut rows = stmt.query(params![key.primary_param()])?;
            first_record(&mut rows)
        }
    }
}

fn select_where<R: SqlRecord>(
    conn: &Connection,
    bindings: Vec<(&'static str, Value)>,
) -> StoreResult<Vec<R>> {
    let mut sql = format!("SELECT {} FROM {} WHERE 1 = 1", R::COLUMNS, R::KIND.table());
    for (column, _) in &bindings {
        sql.push_str(&format!(" AND {column} = ?"));
    }
    sql.push_str(" ORDER BY created_at ASC, id ASC;");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(
        bindings.into_iter().map(|(_, value)| value),
    ))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(R::from_row(row)?);
    }
    Ok(records)
}

fn first_record<R: SqlRecord>(rows: &mut Rows<'_>) -> StoreResult<Option<R>> {
    match rows.next()? {
        Some(row) => Ok(Some(R::from_row(row)?)),
        None => Ok(None),
    }
}

fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Some(failure.extended_code)
        }
        _ => None,
    }
}

pub(crate) fn parse_uuid(row: &Row<'_>, table: &str, column: &str) -> StoreResult<Uuid> {
    let value: String = row.get(column)?;
    Uuid::parse_str(&value).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{value}` in {table}.{column}"))
    })
}

#[cfg(test)]
mod tests {
    use super::{insert_row, SaveOutcome};
    use crate::db::{Database, DatabaseOptions};
    use crate::model::company::{Company, CompanyDraft};
    use crate::store::{StoreError, StoreResult};
    use rusqlite::params;
    use uuid::Uuid;

    fn draft(id: Uuid) -> CompanyDraft {
        CompanyDraft {
            id,
            account_id: Some(Uuid::new_v4()),
            name: Some("Late writer".to_string()),
            logo: Some("http://x/logo.png".to_string()),
            created_at: Some(99),
            ..CompanyDraft::default()
        }
    }

    #[test]
    fn insert_losing_race_merges_into_winning_row() {
        let db = Database::open_in_memory(DatabaseOptions::default()).unwrap();
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();

        let (company, outcome) = db
            .with_connection(None, |conn| -> StoreResult<(Company, SaveOutcome)> {
                conn.execute(
                    "INSERT INTO companies (id, account_id, name, email, created_at)
                     VALUES (?1, ?2, 'First writer', 'first@acme.com', 7);",
                    params![id.to_string(), owner.to_string()],
                )?;
                insert_row::<Company>(conn, draft(id))
            })
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Updated);
        assert_eq!(company.account_id, owner);
        assert_eq!(company.created_at, 7);
        assert_eq!(company.email, "first@acme.com");
        assert_eq!(company.name, "Late writer");
        assert_eq!(company.logo, "http://x/logo.png");
    }

    #[test]
    fn insert_conflict_without_surviving_row_returns_constraint_error() {
        let db = Database::open_in_memory(DatabaseOptions::default()).unwrap();
        let id = Uuid::new_v4();

        // The conflicting row is written by the failing statement itself and
        // rolled back with it, so the second lookup finds nothing.
        let err = db
            .with_connection(None, |conn| -> StoreResult<(Company, SaveOutcome)> {
                conn.execute_batch(&format!(
                    "CREATE TEMP TRIGGER companies_conflict BEFORE INSERT ON companies
                     BEGIN
                         INSERT INTO companies (id, account_id, created_at)
                         VALUES (NEW.id, '{}', 0);
                     END;",
                    Uuid::new_v4()
                ))?;
                insert_row::<Company>(conn, draft(id))
            })
            .unwrap_err();

        assert!(!err.is_not_found());
        assert!(matches!(err, StoreError::Db(_)));
    }

    #[test]
    fn insert_without_owner_is_rejected_before_writing() {
        let db = Database::open_in_memory(DatabaseOptions::default()).unwrap();
        let id = Uuid::new_v4();

        let (err, rows) = db
            .with_connection(None, |conn| -> StoreResult<(StoreError, i64)> {
                let draft = CompanyDraft {
                    account_id: None,
                    ..draft(id)
                };
                let err = insert_row::<Company>(conn, draft).unwrap_err();
                let rows =
                    conn.query_row("SELECT count(*) FROM companies;", [], |row| row.get(0))?;
                Ok((err, rows))
            })
            .unwrap();

        assert!(matches!(
            err,
            StoreError::MissingField {
                field: "account_id",
                ..
            }
        ));
        assert_eq!(rows, 0);
    }
}
