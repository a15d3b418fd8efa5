use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: Uuid,
    pub display_name: String,
    pub discord_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Requested change to a single field of a [`Person`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Set(value) => Some(value),
            Self::Clear => None,
        }
    }
}

/// Partial update of a person, resolved from a request payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonUpdate {
    pub display_name: FieldUpdate<String>,
    pub discord_id: FieldUpdate<i64>,
}

impl PersonUpdate {
    /// `null` leaves the display name alone; `null` leaves the discord id
    /// alone and `0` removes it.
    pub fn resolve(display_name: Option<String>, discord_id: Option<i64>) -> Self {
        let display_name = match display_name {
            None => FieldUpdate::Keep,
            Some(name) => FieldUpdate::Set(name),
        };
        let discord_id = match discord_id {
            None => FieldUpdate::Keep,
            Some(0) => FieldUpdate::Clear,
            Some(id) => FieldUpdate::Set(id),
        };
        Self {
            display_name,
            discord_id,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.display_name == FieldUpdate::Keep && self.discord_id == FieldUpdate::Keep
    }

    pub fn apply_to(self, person: &mut Person) {
        // A display name is never cleared, only replaced.
        if let FieldUpdate::Set(name) = self.display_name {
            person.display_name = name;
        }
        person.discord_id = self.discord_id.apply(person.discord_id);
    }
}
