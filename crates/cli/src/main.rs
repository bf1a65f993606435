//! Showcase CLI - data seeding and management tools.
//!
//! Operates directly on the JSON state files the storefront reads. Stop the
//! storefront first; it does not notice changes made behind its back.
//!
//! # Usage
//!
//! ```bash
//! # Write the seed admin and demo catalog
//! sc-cli seed
//!
//! # Create an admin with a generated password
//! sc-cli admin create -u ops
//!
//! # Ban a visitor
//! sc-cli visitors ban 203.0.113.7
//! ```
//!
//! # Commands
//!
//! - `seed` - Write default data
//! - `admin` - List, create, toggle, reset and delete admins
//! - `visitors` - List, ban, unban, delete and clear visitors
//! - `products` - List and delete products

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sc-cli")]
#[command(author, version, about = "Showcase CLI tools")]
struct Cli {
    /// Directory holding the state files
    #[arg(long, env = "SHOWCASE_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the seed admin and demo catalog where nothing is stored
    Seed {
        /// Overwrite existing products and admins with the defaults
        #[arg(long)]
        force: bool,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage visitor records
    Visitors {
        #[command(subcommand)]
        action: VisitorAction,
    },
    /// Manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List admins
    List,
    /// Create an admin
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (generated when omitted)
        #[arg(short, long)]
        password: Option<String>,

        /// Allow logins from more than one IP
        #[arg(short, long)]
        multi_login: bool,
    },
    /// Activate or deactivate an admin
    ToggleActive { id: String },
    /// Flip the multi-IP login flag
    ToggleMultiLogin { id: String },
    /// Replace an admin's password with a generated one
    ResetPassword { id: String },
    /// Delete an admin
    Delete { id: String },
}

#[derive(Subcommand)]
enum VisitorAction {
    /// List visitors, newest first
    List,
    /// Ban an IP
    Ban { ip: String },
    /// Lift a ban
    Unban { ip: String },
    /// Delete the records for an IP
    Delete { ip: String },
    /// Delete every visitor record
    Clear,
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List,
    /// Delete a product
    Delete { id: i64 },
}

fn main() {
    dotenvy::dotenv().ok();

    // Command output goes through tracing, so default to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CliError> {
    let store = commands::open_store(&cli.data_dir)?;

    match cli.command {
        Commands::Seed { force } => commands::seed::run(store, force)?,
        Commands::Admin { action } => match action {
            AdminAction::List => commands::admin::list(store),
            AdminAction::Create {
                username,
                password,
                multi_login,
            } => commands::admin::create(store, &username, password, multi_login)?,
            AdminAction::ToggleActive { id } => commands::admin::toggle_active(store, &id)?,
            AdminAction::ToggleMultiLogin { id } => {
                commands::admin::toggle_multi_login(store, &id)?;
            }
            AdminAction::ResetPassword { id } => commands::admin::reset_password(store, &id)?,
            AdminAction::Delete { id } => commands::admin::delete(store, &id)?,
        },
        Commands::Visitors { action } => match action {
            VisitorAction::List => commands::visitors::list(store),
            VisitorAction::Ban { ip } => commands::visitors::ban(store, &ip)?,
            VisitorAction::Unban { ip } => commands::visitors::unban(store, &ip)?,
            VisitorAction::Delete { ip } => commands::visitors::delete(store, &ip)?,
            VisitorAction::Clear => commands::visitors::clear(store)?,
        },
        Commands::Products { action } => match action {
            ProductAction::List => commands::products::list(store),
            ProductAction::Delete { id } => commands::products::delete(store, id)?,
        },
    }
    Ok(())
}
