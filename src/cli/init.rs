use anyhow::Result;
use std::path::PathBuf;

const CONFIG_FILE: &str = "ferry.toml";

pub async fn run(path: PathBuf) -> Result<()> {
    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(path.join("data"))?;

    let config = r#"[server]
host = "127.0.0.1"
port = 8000
request_timeout_secs = 30

[database]
path = "./data/ferry.db"
pool_size = 10
"#;

    std::fs::write(&config_path, config)?;

    tracing::info!("Created {}", config_path.display());
    tracing::info!("Run 'ferry migrate' to set up the database");
    tracing::info!("Run 'ferry user add --username <name>' and 'ferry token create <name>' for API access");
    tracing::info!("Run 'ferry serve' to start the server");

    Ok(())
}
