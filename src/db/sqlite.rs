use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Error as SqlxError, Pool, Row, Sqlite};

use crate::db::models::{HandoverRecord, HandoverSummary, Role, SessionRecord, UserRecord};
use crate::db::schema::SQLITE_INIT;
use crate::error::HubError;

pub type SqlitePool = Pool<Sqlite>;

/// Pooled handle to the backing store. Cloned into router state and passed
/// explicitly to every component; there is no process-global connection.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and run the
    /// bundled DDL.
    pub async fn connect(database_url: &str) -> Result<Self, HubError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)
            .map_err(SqlxError::from)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), HubError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ---- users ----

    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, HubError> {
        let row = sqlx::query(
            r#"SELECT username, password_hash, role, display_name, created_at
               FROM users WHERE username = ?"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_user).transpose()
    }

    /// Insert a new user. A primary-key collision maps to `DuplicateUsername`
    /// and leaves the existing record untouched.
    pub async fn insert_user(&self, user: &UserRecord) -> Result<(), HubError> {
        let res = sqlx::query(
            r#"INSERT INTO users (username, password_hash, role, display_name, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.display_name)
        .bind(encode_ts(user.created_at))
        .execute(&self.pool)
        .await;
        match res {
            Ok(_) => Ok(()),
            Err(SqlxError::Database(db)) if db.is_unique_violation() => {
                Err(HubError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, HubError> {
        let rows = sqlx::query(
            r#"SELECT username, password_hash, role, display_name, created_at
               FROM users ORDER BY username"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_user).collect()
    }

    /// Remove a user and every session they own in one transaction, so a
    /// failure between the two writes rolls both back. Returns the number of
    /// user rows removed (0 means no such user).
    pub async fn delete_user_with_sessions(&self, username: &str) -> Result<u64, HubError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sessions WHERE username = ?")
            .bind(username)
            .execute(&mut *tx)
            .await?;
        let affected = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(affected)
    }

    // ---- sessions ----

    pub async fn insert_session(&self, session: &SessionRecord) -> Result<(), HubError> {
        sqlx::query(
            r#"INSERT INTO sessions (session_id, username, role, display_name, login_time)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&session.session_id)
        .bind(&session.username)
        .bind(session.role.as_str())
        .bind(&session.display_name)
        .bind(encode_ts(session.login_time))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_session_by_id(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionRecord>, HubError> {
        let row = sqlx::query(
            r#"SELECT session_id, username, role, display_name, login_time
               FROM sessions WHERE session_id = ?"#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_session).transpose()
    }

    pub async fn delete_session_by_id(&self, session_id: &str) -> Result<(), HubError> {
        sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ---- handover documents ----

    /// Whole-document upsert by id. Last writer wins unconditionally.
    /// Uses SQLite `INSERT ... ON CONFLICT(id) DO UPDATE`.
    pub async fn upsert_handover(
        &self,
        id: &str,
        payload: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), HubError> {
        sqlx::query(
            r#"
            INSERT INTO handovers (id, payload, last_updated)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                payload=excluded.payload,
                last_updated=excluded.last_updated
            "#,
        )
        .bind(id)
        .bind(payload)
        .bind(encode_ts(updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_handover_by_id(&self, id: &str) -> Result<Option<HandoverRecord>, HubError> {
        let row = sqlx::query("SELECT id, payload, last_updated FROM handovers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_handover).transpose()
    }

    pub async fn list_handover_summaries(&self) -> Result<Vec<HandoverSummary>, HubError> {
        let rows =
            sqlx::query("SELECT id, last_updated FROM handovers ORDER BY last_updated DESC")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter()
            .map(|row| {
                Ok(HandoverSummary {
                    id: row.try_get("id")?,
                    last_updated: decode_ts(row.try_get("last_updated")?)?,
                })
            })
            .collect()
    }

    // ---- row mapping ----

    fn row_to_user(row: SqliteRow) -> Result<UserRecord, HubError> {
        let role_str: String = row.try_get("role")?;
        Ok(UserRecord {
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            role: decode_role(&role_str)?,
            display_name: row.try_get("display_name")?,
            created_at: decode_ts(row.try_get("created_at")?)?,
        })
    }

    fn row_to_session(row: SqliteRow) -> Result<SessionRecord, HubError> {
        let role_str: String = row.try_get("role")?;
        Ok(SessionRecord {
            session_id: row.try_get("session_id")?,
            username: row.try_get("username")?,
            role: decode_role(&role_str)?,
            display_name: row.try_get("display_name")?,
            login_time: decode_ts(row.try_get("login_time")?)?,
        })
    }

    fn row_to_handover(row: SqliteRow) -> Result<HandoverRecord, HubError> {
        Ok(HandoverRecord {
            id: row.try_get("id")?,
            payload: row.try_get("payload")?,
            last_updated: decode_ts(row.try_get("last_updated")?)?,
        })
    }
}

/// RFC3339 with fixed microsecond width, so the TEXT column sorts
/// chronologically.
fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_ts(raw: String) -> Result<DateTime<Utc>, HubError> {
    let parsed = DateTime::parse_from_rfc3339(&raw)
        .map_err(|e| SqlxError::Decode(Box::new(e)))?
        .with_timezone(&Utc);
    Ok(parsed)
}

fn decode_role(raw: &str) -> Result<Role, HubError> {
    Role::parse(raw).map_err(|e| SqlxError::Decode(e.into()).into())
}
