pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "cms")]
#[command(about = "Marketing CMS - database and account administration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "User type (role) management")]
    UserType {
        #[command(subcommand)]
        cmd: commands::accounts::UserTypeCommands,
    },

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::accounts::UserCommands,
    },

    #[command(about = "Print an Argon2 hash for a password")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: String,
    },

    #[command(about = "Show the permission catalog")]
    Permissions,

    #[command(about = "Preview related content for an item")]
    Related {
        #[command(subcommand)]
        cmd: commands::content::RelatedCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::database::migrate(output_format).await,
        Commands::UserType { cmd } => commands::accounts::handle_user_type(cmd, output_format).await,
        Commands::User { cmd } => commands::accounts::handle_user(cmd, output_format).await,
        Commands::HashPassword { password } => commands::accounts::hash(&password, output_format),
        Commands::Permissions => commands::accounts::catalog(output_format),
        Commands::Related { cmd } => commands::content::handle(cmd, output_format).await,
    }
}
