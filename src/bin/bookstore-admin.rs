//! Operator tasks that have no API endpoint: promoting an account to admin and
//! loading the sample catalog.

use std::env;
use std::process::ExitCode;

use bookstore::catalog::seed;
use bookstore::logging::{self, LogConfig, LogFormat};
use bookstore::models::Role;
use bookstore::store::{self, Store};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::error;

#[derive(Parser)]
#[command(name = "bookstore-admin", about = "Operator tasks for the bookstore database")]
struct Cli {
    /// Overrides DATABASE_URL.
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grant the admin role to an existing account.
    Promote { email: String },
    /// Replace every book with the bundled sample catalog.
    Seed,
}

fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();
    logging::init(&LogConfig {
        level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        format: LogFormat::Pretty,
    });

    let Some(url) = cli.database_url.or_else(|| env::var("DATABASE_URL").ok()) else {
        error!("DATABASE_URL must be set");
        return ExitCode::FAILURE;
    };
    let store = match store::connect(&url) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "could not open store");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Promote { email } => promote(store.as_ref(), &email),
        Command::Seed => match seed::seed(store.as_ref()) {
            Ok(count) => {
                println!("Seeded {count} books");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "seeding failed");
                ExitCode::FAILURE
            }
        },
    }
}

fn promote(store: &dyn Store, email: &str) -> ExitCode {
    let email = email.trim().to_lowercase();
    match store.set_role(&email, Role::Admin) {
        Ok(Some(user)) => {
            println!("{} ({}) is now an admin", user.name, user.email);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("No user with email \"{email}\"");
            match store.list_users() {
                Ok(users) if !users.is_empty() => {
                    eprintln!("Available users:");
                    for user in users {
                        eprintln!("  - {} ({}) - role: {}", user.name, user.email, user.role);
                    }
                }
                Ok(_) => eprintln!("There are no users yet"),
                Err(e) => error!(error = %e, "could not list users"),
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "could not update role");
            ExitCode::FAILURE
        }
    }
}
