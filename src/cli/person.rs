use crate::services::people;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

use super::PersonCommand;

pub async fn run(config_path: &Path, command: PersonCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path, config.database.pool_size)?;

    match command {
        PersonCommand::Add {
            display_name,
            discord_id,
        } => {
            let person = people::create_person(&db, &display_name, discord_id)?;
            tracing::info!("Person '{}' created", person.display_name);
            println!("{}", person.id);
        }
        PersonCommand::List => {
            let all = people::list_people(&db)?;
            println!("{:<38} {:<30} {}", "ID", "DISPLAY NAME", "DISCORD ID");
            println!("{}", "-".repeat(90));
            for person in &all {
                println!(
                    "{:<38} {:<30} {}",
                    person.id,
                    person.display_name,
                    person
                        .discord_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            println!("\n{} person(s)", all.len());
        }
        PersonCommand::Remove { id } => {
            if people::delete_person(&db, id)? {
                tracing::info!("Person {} removed", id);
            } else {
                anyhow::bail!("Person {} not found", id);
            }
        }
    }

    Ok(())
}
