use crate::services::{api_token, auth};
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

use super::user::require_user;
use super::TokenCommand;

pub async fn run(config_path: &Path, command: TokenCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path, config.database.pool_size)?;

    match command {
        TokenCommand::Create { username } => {
            let user = require_user(&db, &username)?;
            let token = api_token::create_token(&db, user.id)?;
            tracing::info!("Created API token {} for '{}'", token.id, username);
            println!("{}", token.token);
        }
        TokenCommand::List { username } => {
            let user_id = match username {
                Some(name) => Some(require_user(&db, &name)?.id),
                None => None,
            };
            let tokens = api_token::list_tokens(&db, user_id)?;

            println!(
                "{:<38} {:<20} {:<12} {:<8} {}",
                "ID", "USER", "TOKEN", "ACTIVE", "CREATED"
            );
            println!("{}", "-".repeat(110));
            for token in tokens {
                let owner = auth::get_user(&db, token.user_id)?
                    .map(|u| u.username)
                    .unwrap_or_else(|| token.user_id.to_string());
                println!(
                    "{:<38} {:<20} {:<12} {:<8} {}",
                    token.id,
                    owner,
                    token.masked(),
                    if token.is_active { "yes" } else { "no" },
                    token.created_at,
                );
            }
        }
        TokenCommand::Activate { id } => {
            if api_token::set_token_active(&db, id, true)? {
                tracing::info!("Token {} activated", id);
            } else {
                anyhow::bail!("Token {} not found", id);
            }
        }
        TokenCommand::Deactivate { id } => {
            if api_token::set_token_active(&db, id, false)? {
                tracing::info!("Token {} deactivated", id);
            } else {
                anyhow::bail!("Token {} not found", id);
            }
        }
        TokenCommand::Delete { id } => {
            if api_token::delete_token(&db, id)? {
                tracing::info!("Token {} deleted", id);
            } else {
                anyhow::bail!("Token {} not found", id);
            }
        }
    }

    Ok(())
}
