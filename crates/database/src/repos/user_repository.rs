//! User repository: resolves usernames to internal identifiers.

use crate::entities::{CreateUserRequest, User};
use crate::timestamp_now;
use crate::types::{DatabaseError, DatabaseResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, public_id, username, display_name, created_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve a single username. Absence is not an error here.
    pub async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    /// Resolve every username, in input order.
    ///
    /// The number of identities found must equal the number of names given,
    /// so an unknown or repeated name fails with
    /// [`DatabaseError::ResolutionMismatch`].
    pub async fn resolve_usernames(&self, usernames: &[String]) -> DatabaseResult<Vec<User>> {
        let mut unique: Vec<&str> = Vec::with_capacity(usernames.len());
        for name in usernames {
            if !unique.contains(&name.as_str()) {
                unique.push(name.as_str());
            }
        }

        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE username IN ("));
        let mut separated = builder.separated(", ");
        for name in &unique {
            separated.push_bind(name.to_string());
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(&self.pool).await?;
        let found = rows
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        if found.len() != usernames.len() {
            return Err(DatabaseError::ResolutionMismatch {
                expected: usernames.len(),
                resolved: found.len(),
            });
        }

        let mut ordered = Vec::with_capacity(found.len());
        for name in unique {
            if let Some(user) = found.iter().find(|user| user.username == name) {
                ordered.push(user.clone());
            }
        }

        debug!(count = ordered.len(), "resolved usernames");
        Ok(ordered)
    }

    /// Load users by internal id. Unknown ids are skipped; order is unspecified.
    pub async fn find_by_ids(&self, ids: &[i64]) -> DatabaseResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Insert an identity record.
    pub async fn create(&self, request: &CreateUserRequest) -> DatabaseResult<User> {
        let public_id = Uuid::new_v4().to_string();
        let now = timestamp_now();

        let result = sqlx::query(
            "INSERT INTO users (public_id, username, display_name, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(&request.username)
        .bind(&request.display_name)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let user_id = result.last_insert_rowid();
        info!(user_id, username = %request.username, "created user");

        Ok(User {
            id: user_id,
            public_id,
            username: request.username.clone(),
            display_name: request.display_name.clone(),
            created_at: now,
        })
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        created_at: row.try_get("created_at")?,
    })
}
