//! Bazaar CLI - Database migrations and account management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bz-cli migrate
//!
//! # Create an account (password read from BAZAAR_NEW_USER_PASSWORD)
//! bz-cli user create -l root -n "Site Admin" -r admin
//! bz-cli user create -l shop1 -n "Lan Tran" -r seller --shop-name "Lan's Crafts"
//!
//! # Seed a demo seller, buyer and product
//! bz-cli seed demo
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create buyer, seller or admin accounts
//! - `seed demo` - Insert demo data for local development

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bz-cli")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Login name
        #[arg(short, long)]
        login: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Role (`buyer`, `seller`, `admin`)
        #[arg(short, long, default_value = "buyer")]
        role: String,

        /// Contact email
        #[arg(short, long)]
        email: Option<String>,

        /// Shop name (sellers only, defaults to the full name)
        #[arg(long)]
        shop_name: Option<String>,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Demo seller, buyer (with address) and product
    Demo,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                login,
                name,
                role,
                email,
                shop_name,
            } => {
                commands::users::create_user(&login, &name, &role, email, shop_name).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Demo => commands::seed::demo().await?,
        },
    }
    Ok(())
}
