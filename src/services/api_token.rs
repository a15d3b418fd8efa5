use crate::models::{ApiToken, User};
use crate::services::auth::row_to_user;
use crate::Database;
use anyhow::Result;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use rusqlite::OptionalExtension;
use uuid::Uuid;

const TOKEN_BYTE_LENGTH: usize = 32;

const TOKEN_COLUMNS: &str = "id, user_id, token, is_active, created_at, updated_at";

/// Generate a raw random URL-safe token string.
pub fn generate_raw_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTE_LENGTH];
    rand::thread_rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Issue a new active token for a user.
pub fn create_token(db: &Database, user_id: i64) -> Result<ApiToken> {
    let now = chrono::Utc::now().to_rfc3339();
    let token = ApiToken {
        id: Uuid::new_v4(),
        user_id,
        token: generate_raw_token(),
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
    };

    let conn = db.get()?;
    conn.execute(
        "INSERT INTO api_tokens (id, user_id, token, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            token.id.to_string(),
            token.user_id,
            token.token,
            token.is_active,
            token.created_at,
            token.updated_at,
        ],
    )?;

    Ok(token)
}

/// Resolve a presented bearer token to its owner. Only exact matches on
/// tokens that exist and are active succeed.
pub fn validate_token(db: &Database, raw_token: &str) -> Result<Option<User>> {
    if raw_token.is_empty() {
        return Ok(None);
    }

    let conn = db.get()?;
    let user = conn
        .query_row(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.password_hash,
                   u.is_active, u.is_staff, u.is_superuser, u.last_login, u.date_joined
            FROM api_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = ? AND t.is_active = 1
            "#,
            [raw_token],
            row_to_user,
        )
        .optional()?;

    Ok(user)
}

pub fn get_token(db: &Database, id: Uuid) -> Result<Option<ApiToken>> {
    let conn = db.get()?;
    let token = conn
        .query_row(
            &format!("SELECT {} FROM api_tokens WHERE id = ?", TOKEN_COLUMNS),
            [id.to_string()],
            row_to_token,
        )
        .optional()?;
    Ok(token)
}

/// List tokens, optionally restricted to one user, oldest first.
pub fn list_tokens(db: &Database, user_id: Option<i64>) -> Result<Vec<ApiToken>> {
    let conn = db.get()?;
    let tokens = match user_id {
        Some(user_id) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM api_tokens WHERE user_id = ? ORDER BY created_at, rowid",
                TOKEN_COLUMNS
            ))?;
            let rows = stmt.query_map([user_id], row_to_token)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM api_tokens ORDER BY created_at, rowid",
                TOKEN_COLUMNS
            ))?;
            let rows = stmt.query_map([], row_to_token)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(tokens)
}

/// Turn a token on or off. Returns false when no such token exists.
pub fn set_token_active(db: &Database, id: Uuid, active: bool) -> Result<bool> {
    let now = chrono::Utc::now().to_rfc3339();
    let conn = db.get()?;
    let affected = conn.execute(
        "UPDATE api_tokens SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![active, now, id.to_string()],
    )?;
    Ok(affected > 0)
}

pub fn delete_token(db: &Database, id: Uuid) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute("DELETE FROM api_tokens WHERE id = ?", [id.to_string()])?;
    Ok(affected > 0)
}

fn row_to_token(row: &rusqlite::Row<'_>) -> rusqlite::Result<ApiToken> {
    let id: String = row.get(0)?;
    Ok(ApiToken {
        id: parse_uuid_column(0, &id)?,
        user_id: row.get(1)?,
        token: row.get(2)?,
        is_active: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub(crate) fn parse_uuid_column(index: usize, value: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}
