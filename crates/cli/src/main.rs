//! Shoptill CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! shoptill-cli migrate
//!
//! # Create a staff user
//! shoptill-cli admin create -u admin -p <password> --admin
//!
//! # Seed the database with a demo catalog and an admin/admin login
//! shoptill-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create staff users
//! - `seed` - Seed the database with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shoptill-cli")]
#[command(author, version, about = "Shoptill CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage staff users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database with demo data
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new staff user
    Create {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password (min 8 characters)
        #[arg(short, long)]
        password: String,

        /// Grant admin rights
        #[arg(long)]
        admin: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                password,
                admin,
            } => {
                commands::admin::create_user(&username, &password, admin).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
