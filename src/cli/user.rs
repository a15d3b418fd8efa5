use crate::models::{NewUser, UserFlags};
use crate::{services::auth, Config, Database};
use anyhow::Result;
use std::path::Path;

use super::UserCommand;

pub async fn run(config_path: &Path, command: UserCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path, config.database.pool_size)?;

    match command {
        UserCommand::Add {
            username,
            email,
            first_name,
            last_name,
            password,
            staff,
            superuser,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_new_password("Password: ")?,
            };

            auth::create_user(
                &db,
                &NewUser {
                    username: &username,
                    email: &email,
                    first_name: &first_name,
                    last_name: &last_name,
                    password: &password,
                    is_staff: staff,
                    is_superuser: superuser,
                },
            )?;
            tracing::info!("User '{}' created", username);
        }
        UserCommand::List => {
            let users = auth::list_users(&db)?;

            println!(
                "{:<20} {:<30} {:<24} {:<8} {:<6}",
                "USERNAME", "EMAIL", "NAME", "ACTIVE", "STAFF"
            );
            println!("{}", "-".repeat(92));
            for user in users {
                println!(
                    "{:<20} {:<30} {:<24} {:<8} {:<6}",
                    user.username,
                    user.email,
                    user.full_name(),
                    yes_no(user.is_active),
                    yes_no(user.is_staff || user.is_superuser),
                );
            }
        }
        UserCommand::Remove { username } => {
            let user = require_user(&db, &username)?;
            if auth::delete_user(&db, user.id)? {
                tracing::info!("User '{}' removed along with their API tokens", username);
            }
        }
        UserCommand::Passwd { username } => {
            let password = prompt_new_password("New password: ")?;
            auth::update_password(&db, &username, &password)?;
            tracing::info!("Password updated for '{}'", username);
        }
        UserCommand::Activate { username } => {
            let user = require_user(&db, &username)?;
            auth::set_user_flags(
                &db,
                user.id,
                UserFlags {
                    is_active: Some(true),
                    ..Default::default()
                },
            )?;
            tracing::info!("User '{}' activated", username);
        }
        UserCommand::Deactivate { username } => {
            let user = require_user(&db, &username)?;
            auth::set_user_flags(
                &db,
                user.id,
                UserFlags {
                    is_active: Some(false),
                    ..Default::default()
                },
            )?;
            tracing::info!("User '{}' deactivated", username);
        }
    }

    Ok(())
}

pub(crate) fn require_user(db: &Database, username: &str) -> Result<crate::models::User> {
    auth::get_user_by_username(db, username)?
        .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))
}

fn prompt_new_password(prompt: &str) -> Result<String> {
    let password = rpassword::prompt_password(prompt)?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
