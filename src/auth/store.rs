//! Credential Storage
//! Persistence collaborator for the single admin credential

use crate::auth::models::AdminCredential;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Id of the one credential row.
const CREDENTIAL_ROW_ID: i64 = 1;

/// Keyed store holding at most one admin credential.
pub trait CredentialStore: Send + Sync {
    fn find_admin_credential(&self) -> Result<Option<AdminCredential>>;

    /// Insert the credential. Returns `None` when one already exists.
    fn create_admin_credential(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<AdminCredential>>;

    /// Replace the hash only if the stored hash still equals `expected_hash`.
    /// Returns `None` when the row changed underneath the caller.
    fn update_admin_credential_hash(
        &self,
        id: i64,
        expected_hash: &str,
        new_hash: &str,
    ) -> Result<Option<AdminCredential>>;

    fn count_admin_credentials(&self) -> Result<i64>;
}

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

-- The CHECK on id keeps the table a singleton.
CREATE TABLE IF NOT EXISTS admin_credentials (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    username TEXT NOT NULL,
    password_hash TEXT NOT NULL CHECK (length(password_hash) > 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// SQLite-backed credential store
pub struct SqliteCredentialStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCredentialStore {
    /// Open (or create) the credential table in the database at `db_path`
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open credential database at {}", db_path))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize admin_credentials schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_credential(row: &Row<'_>) -> rusqlite::Result<AdminCredential> {
        Ok(AdminCredential {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get::<_, DateTime<Utc>>(3)?,
            updated_at: row.get::<_, DateTime<Utc>>(4)?,
        })
    }

    fn select(conn: &Connection) -> Result<Option<AdminCredential>> {
        conn.query_row(
            "SELECT id, username, password_hash, created_at, updated_at
             FROM admin_credentials WHERE id = ?1",
            params![CREDENTIAL_ROW_ID],
            Self::row_to_credential,
        )
        .optional()
        .context("Failed to read admin credential")
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn find_admin_credential(&self) -> Result<Option<AdminCredential>> {
        let conn = self.conn.lock();
        Self::select(&conn)
    }

    fn create_admin_credential(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<AdminCredential>> {
        if password_hash.is_empty() {
            bail!("Refusing to store an empty password hash");
        }

        let now = Utc::now();
        let conn = self.conn.lock();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO admin_credentials
                    (id, username, password_hash, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![CREDENTIAL_ROW_ID, username, password_hash, now],
            )
            .context("Failed to insert admin credential")?;

        if inserted == 0 {
            debug!("Admin credential already present, insert ignored");
            return Ok(None);
        }

        Ok(Some(AdminCredential {
            id: CREDENTIAL_ROW_ID,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        }))
    }

    fn update_admin_credential_hash(
        &self,
        id: i64,
        expected_hash: &str,
        new_hash: &str,
    ) -> Result<Option<AdminCredential>> {
        if new_hash.is_empty() {
            bail!("Refusing to store an empty password hash");
        }

        let conn = self.conn.lock();

        let updated = conn
            .execute(
                "UPDATE admin_credentials
                 SET password_hash = ?1, updated_at = ?2
                 WHERE id = ?3 AND password_hash = ?4",
                params![new_hash, Utc::now(), id, expected_hash],
            )
            .context("Failed to update admin credential")?;

        if updated == 0 {
            return Ok(None);
        }

        Self::select(&conn)
    }

    fn count_admin_credentials(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM admin_credentials", [], |row| {
            row.get(0)
        })
        .context("Failed to count admin credentials")
    }
}

/// In-memory credential store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryCredentialStore {
    record: Mutex<Option<AdminCredential>>,
    fail_writes: AtomicBool,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, simulating an unreachable backend.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current stored hash, if any.
    pub fn stored_hash(&self) -> Option<String> {
        self.record.lock().as_ref().map(|c| c.password_hash.clone())
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("credential store unavailable");
        }
        Ok(())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn find_admin_credential(&self) -> Result<Option<AdminCredential>> {
        Ok(self.record.lock().clone())
    }

    fn create_admin_credential(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<AdminCredential>> {
        self.check_writable()?;
        if password_hash.is_empty() {
            bail!("Refusing to store an empty password hash");
        }

        let mut record = self.record.lock();
        if record.is_some() {
            return Ok(None);
        }

        let now = Utc::now();
        let credential = AdminCredential {
            id: CREDENTIAL_ROW_ID,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        *record = Some(credential.clone());
        Ok(Some(credential))
    }

    fn update_admin_credential_hash(
        &self,
        id: i64,
        expected_hash: &str,
        new_hash: &str,
    ) -> Result<Option<AdminCredential>> {
        self.check_writable()?;
        if new_hash.is_empty() {
            bail!("Refusing to store an empty password hash");
        }

        let mut record = self.record.lock();
        match record.as_mut() {
            Some(c) if c.id == id && c.password_hash == expected_hash => {
                c.password_hash = new_hash.to_string();
                c.updated_at = Utc::now();
                Ok(Some(c.clone()))
            }
            _ => Ok(None),
        }
    }

    fn count_admin_credentials(&self) -> Result<i64> {
        Ok(i64::from(self.record.lock().is_some()))
    }
}
