use crate::models::{NewUser, User, UserFlags};
use crate::Database;
use anyhow::Result;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use rusqlite::OptionalExtension;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_USERNAME_LENGTH: usize = 150;
const MAX_EMAIL_LENGTH: usize = 254;

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, \
     is_active, is_staff, is_superuser, last_login, date_joined";

fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        anyhow::bail!("Username cannot be empty");
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        anyhow::bail!(
            "Username must be {} characters or less",
            MAX_USERNAME_LENGTH
        );
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        anyhow::bail!("Username can only contain letters, numbers, and @/./+/-/_");
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    // Email is optional on accounts.
    if email.is_empty() {
        return Ok(());
    }
    if email.len() > MAX_EMAIL_LENGTH {
        anyhow::bail!("Email must be {} characters or less", MAX_EMAIL_LENGTH);
    }
    if !email.contains('@') || !email.contains('.') {
        anyhow::bail!("Invalid email format");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        anyhow::bail!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        );
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        anyhow::bail!("Password cannot be entirely numeric");
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String> {
    validate_password(password)?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dW5rbm93bg$0000000000000000000000000000000000000000000";

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => {
            if let Ok(dummy) = PasswordHash::new(DUMMY_HASH) {
                let _ = Argon2::default().verify_password(password.as_bytes(), &dummy);
            }
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        password_hash: row.get(5)?,
        is_active: row.get(6)?,
        is_staff: row.get(7)?,
        is_superuser: row.get(8)?,
        last_login: row.get(9)?,
        date_joined: row.get(10)?,
    })
}

pub fn create_user(db: &Database, new_user: &NewUser<'_>) -> Result<i64> {
    validate_username(new_user.username)?;
    validate_email(new_user.email)?;
    let password_hash = hash_password(new_user.password)?;
    let now = chrono::Utc::now().to_rfc3339();

    let conn = db.get()?;
    conn.execute(
        "INSERT INTO users (username, email, first_name, last_name, password_hash, is_staff, is_superuser, date_joined)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            new_user.username,
            new_user.email,
            new_user.first_name,
            new_user.last_name,
            password_hash,
            new_user.is_staff,
            new_user.is_superuser,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_password(db: &Database, username: &str, password: &str) -> Result<()> {
    let password_hash = hash_password(password)?;
    let conn = db.get()?;
    let affected = conn.execute(
        "UPDATE users SET password_hash = ? WHERE username = ?",
        (&password_hash, username),
    )?;
    if affected == 0 {
        anyhow::bail!("User '{}' not found", username);
    }
    Ok(())
}

/// Check a username/password pair. Inactive accounts never authenticate.
pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<Option<User>> {
    let user = match get_user_by_username(db, username)? {
        Some(u) => u,
        None => {
            let _ = verify_password(password, DUMMY_HASH);
            return Ok(None);
        }
    };

    if !user.is_active || !verify_password(password, &user.password_hash) {
        return Ok(None);
    }

    let now = chrono::Utc::now().to_rfc3339();
    let conn = db.get()?;
    conn.execute(
        "UPDATE users SET last_login = ? WHERE id = ?",
        (&now, user.id),
    )?;

    Ok(Some(User {
        last_login: Some(now),
        ..user
    }))
}

pub fn list_users(db: &Database) -> Result<Vec<User>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY username",
        USER_COLUMNS
    ))?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn get_user(db: &Database, id: i64) -> Result<Option<User>> {
    let conn = db.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
            [id],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn get_user_by_username(db: &Database, username: &str) -> Result<Option<User>> {
    let conn = db.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS),
            [username],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn set_user_flags(db: &Database, id: i64, flags: UserFlags) -> Result<()> {
    let conn = db.get()?;
    if let Some(active) = flags.is_active {
        conn.execute("UPDATE users SET is_active = ? WHERE id = ?", (active, id))?;
    }
    if let Some(staff) = flags.is_staff {
        conn.execute("UPDATE users SET is_staff = ? WHERE id = ?", (staff, id))?;
    }
    if let Some(superuser) = flags.is_superuser {
        conn.execute(
            "UPDATE users SET is_superuser = ? WHERE id = ?",
            (superuser, id),
        )?;
    }
    Ok(())
}

/// Delete a user. Their API tokens go with them.
pub fn delete_user(db: &Database, id: i64) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute("DELETE FROM users WHERE id = ?", [id])?;
    Ok(affected > 0)
}
