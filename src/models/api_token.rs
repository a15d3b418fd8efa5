use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct ApiToken {
    pub id: Uuid,
    pub user_id: i64,
    pub token: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ApiToken {
    /// Shortened form of the token for listings, e.g. `Xk3v9a...`.
    pub fn masked(&self) -> String {
        let end = self
            .token
            .char_indices()
            .nth(6)
            .map(|(i, _)| i)
            .unwrap_or(self.token.len());
        format!("{}...", &self.token[..end])
    }
}
