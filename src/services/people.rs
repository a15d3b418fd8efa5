use crate::models::{Person, PersonUpdate};
use crate::services::api_token::parse_uuid_column;
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

const PERSON_COLUMNS: &str = "id, display_name, discord_id, created_at, updated_at";

pub fn create_person(db: &Database, display_name: &str, discord_id: Option<i64>) -> Result<Person> {
    if display_name.trim().is_empty() {
        anyhow::bail!("Display name cannot be empty");
    }
    // Zero is reserved as the "no discord account" marker in updates.
    let discord_id = discord_id.filter(|id| *id != 0);

    let now = chrono::Utc::now().to_rfc3339();
    let person = Person {
        id: Uuid::new_v4(),
        display_name: display_name.to_string(),
        discord_id,
        created_at: now.clone(),
        updated_at: now,
    };

    let conn = db.get()?;
    conn.execute(
        "INSERT INTO people (id, display_name, discord_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            person.id.to_string(),
            person.display_name,
            person.discord_id,
            person.created_at,
            person.updated_at,
        ],
    )?;

    Ok(person)
}

/// All people in insertion order.
pub fn list_people(db: &Database) -> Result<Vec<Person>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM people ORDER BY rowid",
        PERSON_COLUMNS
    ))?;
    let people = stmt
        .query_map([], row_to_person)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(people)
}

pub fn count_people(db: &Database) -> Result<i64> {
    let conn = db.get()?;
    let count = conn.query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))?;
    Ok(count)
}

pub fn get_person(db: &Database, id: Uuid) -> Result<Option<Person>> {
    let conn = db.get()?;
    fetch_person(&conn, id)
}

pub fn get_person_by_discord_id(db: &Database, discord_id: i64) -> Result<Option<Person>> {
    let conn = db.get()?;
    let person = conn
        .query_row(
            &format!("SELECT {} FROM people WHERE discord_id = ?", PERSON_COLUMNS),
            [discord_id],
            row_to_person,
        )
        .optional()?;
    Ok(person)
}

/// Apply a partial update and return the stored result, or `None` when the
/// person does not exist. Read and write share one transaction, taken with
/// the write lock up front so concurrent updates wait on `busy_timeout`
/// instead of failing the read-to-write upgrade.
pub fn update_person(db: &Database, id: Uuid, update: PersonUpdate) -> Result<Option<Person>> {
    let mut conn = db.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut person = match fetch_person(&tx, id)? {
        Some(p) => p,
        None => return Ok(None),
    };

    if update.is_noop() {
        return Ok(Some(person));
    }

    update.apply_to(&mut person);
    person.updated_at = chrono::Utc::now().to_rfc3339();

    tx.execute(
        "UPDATE people SET display_name = ?1, discord_id = ?2, updated_at = ?3 WHERE id = ?4",
        rusqlite::params![
            person.display_name,
            person.discord_id,
            person.updated_at,
            person.id.to_string(),
        ],
    )?;
    tx.commit()?;

    tracing::debug!(person_id = %person.id, "Person updated");
    Ok(Some(person))
}

pub fn delete_person(db: &Database, id: Uuid) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute("DELETE FROM people WHERE id = ?", [id.to_string()])?;
    Ok(affected > 0)
}

fn fetch_person(conn: &Connection, id: Uuid) -> Result<Option<Person>> {
    let person = conn
        .query_row(
            &format!("SELECT {} FROM people WHERE id = ?", PERSON_COLUMNS),
            [id.to_string()],
            row_to_person,
        )
        .optional()?;
    Ok(person)
}

fn row_to_person(row: &rusqlite::Row<'_>) -> rusqlite::Result<Person> {
    let id: String = row.get(0)?;
    Ok(Person {
        id: parse_uuid_column(0, &id)?,
        display_name: row.get(1)?,
        discord_id: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
