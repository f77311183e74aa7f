//! Database directory of registered identities.
//!
//! The directory owns the `users` table contract: create and find. Rows are
//! never mutated or deleted here.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

/// Public view of a registered user. The stored password hash stays inside
/// this module and the login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
}

/// Row fetched for credential verification.
pub(crate) struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    pub(crate) password_hash: String,
}

/// Outcome when attempting to create a new user row.
#[derive(Debug)]
pub(crate) enum CreateOutcome {
    Created(Identity),
    Conflict,
    Invalid(String),
}

/// Insert a new user, relying on the unique index for duplicate detection.
///
/// A prior `SELECT` would only open a race window between concurrent
/// registrations of the same username; the constraint is the arbiter.
pub(crate) async fn insert_user(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> Result<CreateOutcome> {
    let query = r"
        INSERT INTO users (username, password_hash)
        VALUES ($1, $2)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(CreateOutcome::Created(Identity {
            id: row.get("id"),
            username: username.to_string(),
        })),
        Err(err) => {
            if is_unique_violation(&err) {
                return Ok(CreateOutcome::Conflict);
            }
            if let Some(reason) = validation_reason(&err) {
                return Ok(CreateOutcome::Invalid(reason));
            }
            Err(err).context("failed to insert user")
        }
    }
}

/// Look up a user by username for credential verification.
pub(crate) async fn lookup_user(pool: &PgPool, username: &str) -> Result<Option<UserRecord>> {
    let query = "SELECT id, username, password_hash FROM users WHERE username = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user")?;

    Ok(row.map(|row| UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
    }))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Map not-null and check violations to a user-facing reason; anything else
/// stays a fault.
fn validation_reason(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code()?;
            if code.as_ref() == "23502" || code.as_ref() == "23514" {
                Some(db_err.message().to_string())
            } else {
                None
            }
        }
        _ => None,
    }
}
