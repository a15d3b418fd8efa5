pub mod init;
pub mod migrate;
pub mod person;
pub mod serve;
pub mod token;
pub mod user;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ferry")]
#[command(version)]
#[command(about = "People registry with an API-token protected JSON API", long_about = None)]
pub struct Cli {
    #[arg(short, long, env = "FERRY_CONFIG", default_value = "ferry.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a config file and data directory
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Start the HTTP API server
    Serve {
        /// Overrides server.host from the config file
        #[arg(short = 'H', long)]
        host: Option<String>,
        /// Overrides server.port from the config file
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply or inspect database migrations
    Migrate {
        #[command(subcommand)]
        command: Option<MigrateCommand>,
    },
    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
    /// Manage people records
    Person {
        #[command(subcommand)]
        command: PersonCommand,
    },
}

#[derive(Subcommand)]
pub enum MigrateCommand {
    Status,
}

#[derive(Subcommand)]
pub enum UserCommand {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        staff: bool,
        #[arg(long)]
        superuser: bool,
    },
    List,
    Remove {
        username: String,
    },
    Passwd {
        username: String,
    },
    Activate {
        username: String,
    },
    Deactivate {
        username: String,
    },
}

#[derive(Subcommand)]
pub enum TokenCommand {
    /// Issue a new token; the value is printed once
    Create {
        username: String,
    },
    List {
        #[arg(long)]
        username: Option<String>,
    },
    Activate {
        id: uuid::Uuid,
    },
    Deactivate {
        id: uuid::Uuid,
    },
    Delete {
        id: uuid::Uuid,
    },
}

#[derive(Subcommand)]
pub enum PersonCommand {
    Add {
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        discord_id: Option<i64>,
    },
    List,
    Remove {
        id: uuid::Uuid,
    },
}
