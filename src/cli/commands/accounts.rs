use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::auth::hash_password;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::models::UserView;
use crate::permissions::{self, CATALOG};
use crate::services::AccountService;
use crate::store::AccountStore;

#[derive(Subcommand)]
pub enum UserTypeCommands {
    #[command(about = "List user types")]
    List,

    #[command(about = "Create a user type")]
    Create {
        #[arg(long, help = "Display name, e.g. Editor")]
        name: String,

        #[arg(long, help = "Optional description")]
        description: Option<String>,

        #[arg(long, value_delimiter = ',', help = "Comma-separated permissions, e.g. blogs.view,blogs.edit")]
        permissions: Vec<String>,

        #[arg(long, conflicts_with = "permissions", help = "Grant every permission in the catalog")]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List users")]
    List,

    #[command(about = "Create a user")]
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, help = "User type name or id")]
        user_type: String,
    },
}

async fn account_service() -> anyhow::Result<(AccountService, Arc<dyn AccountStore>)> {
    let accounts: Arc<dyn AccountStore> = connect_store().await?;
    let service = AccountService::new(Arc::clone(&accounts), config().security.min_password_length);
    Ok((service, accounts))
}

pub async fn handle_user_type(cmd: UserTypeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (service, accounts) = account_service().await?;

    match cmd {
        UserTypeCommands::List => {
            let types = accounts.list_user_types().await?;
            if types.is_empty() {
                return output_empty_collection(&output_format, "user_types", "No user types");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "user_types": types }))?);
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<20} {:<8} {}", "ID", "NAME", "ACTIVE", "PERMISSIONS");
                    println!("{}", "-".repeat(90));
                    for t in &types {
                        println!("{:<38} {:<20} {:<8} {}", t.id, t.name, t.active, t.permissions.join(","));
                    }
                }
            }
            Ok(())
        }
        UserTypeCommands::Create {
            name,
            description,
            permissions,
            all,
        } => {
            let granted = if all {
                permissions::all().into_iter().map(String::from).collect()
            } else {
                permissions
            };

            let created = service.create_user_type(&name, description, granted).await?;
            output_success(
                &output_format,
                &format!("User type '{}' created ({} permissions)", created.name, created.permissions.len()),
                Some(json!({ "user_type": created })),
            )
        }
    }
}

pub async fn handle_user(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (service, accounts) = account_service().await?;

    match cmd {
        UserCommands::List => {
            let users = accounts.list_users().await?;
            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users");
            }

            let views: Vec<UserView> = users.iter().map(UserView::from).collect();
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "users": views }))?);
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<30} {:<20} {}", "ID", "EMAIL", "NAME", "ACTIVE");
                    println!("{}", "-".repeat(96));
                    for u in &views {
                        println!("{:<38} {:<30} {:<20} {}", u.id, u.email, u.name, u.active);
                    }
                }
            }
            Ok(())
        }
        UserCommands::Create {
            name,
            email,
            password,
            user_type,
        } => {
            let user_type = service.resolve_user_type(&user_type).await?;
            let created = service.create_user(&name, &email, &password, &user_type).await?;
            output_success(
                &output_format,
                &format!("User {} created as {}", created.email, user_type.name),
                Some(json!({ "user": UserView::from(&created) })),
            )
        }
    }
}

pub fn hash(password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let hashed = hash_password(password)?;
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "hash": hashed }))?),
        OutputFormat::Text => println!("{}", hashed),
    }
    Ok(())
}

pub fn catalog(output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "permissions": CATALOG }))?);
        }
        OutputFormat::Text => {
            for group in CATALOG {
                println!("{}", group.label);
                for p in group.permissions {
                    println!("  {}", p);
                }
            }
        }
    }
    Ok(())
}
