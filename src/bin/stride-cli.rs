// ABOUTME: Admin utility for the Stride backend
// ABOUTME: Creates admin users and manages account approval directly against the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::expect_used, clippy::print_stdout)]

use anyhow::Result;
use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::distributions::Alphanumeric;
use rand::Rng;

use stride_api::{
    config::ServerConfig,
    database::Database,
    logging,
    models::{User, UserRole, UserStatus},
};

/// Stride admin utility
#[derive(Parser)]
#[command(name = "stride-cli", version, about)]
struct Args {
    /// Database URL (defaults to DATABASE_URL / config default)
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create (or update) an admin user
    CreateAdmin {
        /// Admin email address
        email: String,
        /// Password; generated when omitted
        #[arg(long)]
        password: Option<String>,
        /// Display name; derived from the email when omitted
        #[arg(long)]
        name: Option<String>,
    },
    /// List users by status
    ListUsers {
        /// Status filter: pending, active, suspended
        #[arg(long, default_value = "pending")]
        status: String,
    },
    /// Approve a pending user by email
    Approve {
        /// Email of the user to approve
        email: String,
    },
    /// Suspend a user by email
    Suspend {
        /// Email of the user to suspend
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let args = Args::parse();
    let config = ServerConfig::from_env()?;
    let database_url = args.database_url.unwrap_or(config.database_url);
    let database = Database::new(&database_url).await?;

    match args.command {
        Command::CreateAdmin {
            email,
            password,
            name,
        } => create_admin(&database, email, password, name).await?,
        Command::ListUsers { status } => list_users(&database, &status).await?,
        Command::Approve { email } => set_status(&database, &email, UserStatus::Active).await?,
        Command::Suspend { email } => set_status(&database, &email, UserStatus::Suspended).await?,
    }

    Ok(())
}

/// Create or update an admin account
async fn create_admin(
    database: &Database,
    email: String,
    password: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let password = password.unwrap_or_else(generate_password);
    let display_name =
        name.unwrap_or_else(|| email.split('@').next().unwrap_or("Admin").to_owned());
    let password_hash = hash(&password, DEFAULT_COST)?;

    let base = match database.get_user_by_email(&email).await? {
        Some(existing) => existing,
        None => User::new(email.clone(), password_hash.clone(), None),
    };

    let user = User {
        email: email.clone(),
        display_name: Some(display_name),
        password_hash,
        role: UserRole::Admin,
        user_status: UserStatus::Active,
        is_active: true,
        approved_at: Some(Utc::now()),
        last_active: Utc::now(),
        ..base
    };

    database.create_user(&user).await?;

    println!("Admin user ready: {email}");
    println!("Password: {password}");
    Ok(())
}

/// Print users in one status
async fn list_users(database: &Database, status: &str) -> Result<()> {
    let status = UserStatus::from_str_lossy(status);
    let users = database.get_users_by_status(status).await?;

    println!("{} user(s) with status {status}:", users.len());
    for user in users {
        println!(
            "  {}  {}  created {}",
            user.id,
            user.email,
            user.created_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    Ok(())
}

/// Change one user's status by email
async fn set_status(database: &Database, email: &str, status: UserStatus) -> Result<()> {
    let user = database.get_user_by_email_required(email).await?;
    database.update_user_status(user.id, status, None).await?;
    println!("User {email} is now {status}");
    Ok(())
}

/// Generate a random 16-character password
fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}
