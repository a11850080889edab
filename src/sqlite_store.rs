//! SQLite-backed waitlist store
//!
//! Uniqueness of the normalized email is enforced by a UNIQUE index, so two
//! concurrent signups for the same address cannot both commit regardless of
//! how their requests interleave. The connection lives behind a mutex and
//! every call runs on the blocking thread pool.

use crate::waitlist_entry::{EntryId, NewWaitlistEntry, NormalizedEmail, WaitlistEntry};
use crate::waitlist_store::{
    CountFilter, GroupCount, GroupField, SortDirection, SortField, StoreError, WaitlistStore,
};
use async_trait::async_trait;
use chrono::DateTime;
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS waitlist_entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL,
        name TEXT NOT NULL,
        farm_type TEXT NOT NULL,
        farm_size TEXT NOT NULL,
        interests TEXT NOT NULL,
        signup_date INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'active'
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_waitlist_entries_email
        ON waitlist_entries(email);
    CREATE INDEX IF NOT EXISTS idx_waitlist_entries_signup_date
        ON waitlist_entries(signup_date DESC);
";

const ENTRY_COLUMNS: &str =
    "id, email, name, farm_type, farm_size, interests, signup_date, status";

/// Waitlist store persisted in a single SQLite database file
#[derive(Clone)]
pub struct SqliteWaitlistStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWaitlistStore {
    /// Open (or create) the database at `path` and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        debug!("SQLite journal mode: {}", journal_mode);

        let store = Self::from_connection(conn)?;
        info!("Waitlist store opened at {}", path.display());
        Ok(store)
    }

    /// Private in-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || f(&conn.lock())).await?
    }
}

fn group_column(field: GroupField) -> &'static str {
    match field {
        GroupField::FarmType => "farm_type",
        GroupField::FarmSize => "farm_size",
        GroupField::Interests => "interests",
        GroupField::Status => "status",
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::SignupDate => "signup_date",
        SortField::Email => "email",
        SortField::Name => "name",
    }
}

fn sort_keyword(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Column values as stored, before enum parsing
struct RawEntry {
    id: EntryId,
    email: String,
    name: String,
    farm_type: String,
    farm_size: String,
    interests: String,
    signup_date: i64,
    status: String,
}

impl RawEntry {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            farm_type: row.get(3)?,
            farm_size: row.get(4)?,
            interests: row.get(5)?,
            signup_date: row.get(6)?,
            status: row.get(7)?,
        })
    }

    fn into_entry(self) -> Result<WaitlistEntry, StoreError> {
        let id = self.id;
        let corrupt = |reason: String| StoreError::CorruptRow { id, reason };

        Ok(WaitlistEntry {
            id,
            email: NormalizedEmail::parse(&self.email)
                .ok_or_else(|| corrupt("empty email".to_string()))?,
            name: self.name,
            farm_type: self
                .farm_type
                .parse()
                .map_err(|e| corrupt(format!("farm_type: {e}")))?,
            farm_size: self
                .farm_size
                .parse()
                .map_err(|e| corrupt(format!("farm_size: {e}")))?,
            interests: self
                .interests
                .parse()
                .map_err(|e| corrupt(format!("interests: {e}")))?,
            signup_date: DateTime::from_timestamp_millis(self.signup_date)
                .ok_or_else(|| corrupt(format!("signup_date out of range: {}", self.signup_date)))?,
            status: self
                .status
                .parse()
                .map_err(|e| corrupt(format!("status: {e}")))?,
        })
    }
}

#[async_trait]
impl WaitlistStore for SqliteWaitlistStore {
    async fn insert_unique(&self, entry: NewWaitlistEntry) -> Result<EntryId, StoreError> {
        self.with_conn(move |conn| {
            let result = conn.execute(
                "INSERT INTO waitlist_entries
                 (email, name, farm_type, farm_size, interests, signup_date, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.email.as_str(),
                    entry.name,
                    entry.farm_type.as_str(),
                    entry.farm_size.as_str(),
                    entry.interests.as_str(),
                    entry.signup_date.timestamp_millis(),
                    entry.status.as_str(),
                ],
            );

            match result {
                Ok(_) => Ok(conn.last_insert_rowid()),
                Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateEmail),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn count(&self, filter: CountFilter) -> Result<u64, StoreError> {
        let threshold = filter
            .signed_up_since
            .map(|t| t.timestamp_millis())
            .unwrap_or(i64::MIN);

        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM waitlist_entries WHERE signup_date >= ?1",
                params![threshold],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    async fn group_by(&self, field: GroupField) -> Result<Vec<GroupCount>, StoreError> {
        let column = group_column(field);
        let sql = format!(
            "SELECT {column}, COUNT(*) AS n FROM waitlist_entries
             GROUP BY {column}
             ORDER BY n DESC, MIN(id) ASC"
        );

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let groups = stmt
                .query_map([], |row| {
                    Ok(GroupCount {
                        value: row.get(0)?,
                        count: row.get::<_, i64>(1)? as u64,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(groups)
        })
        .await
    }

    async fn list_all(
        &self,
        field: SortField,
        direction: SortDirection,
    ) -> Result<Vec<WaitlistEntry>, StoreError> {
        let keyword = sort_keyword(direction);
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM waitlist_entries ORDER BY {} {keyword}, id {keyword}",
            sort_column(field)
        );

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], RawEntry::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(RawEntry::into_entry).collect()
        })
        .await
    }
}
