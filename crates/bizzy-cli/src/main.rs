//! Bizzy - a terminal front end for the booking client.
//!
//! Logs in against the booking backend, caching the token and email in the
//! encrypted store, then edits an in-memory calendar of reservations.

mod app;
mod commands;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use bizzy_core::api::AuthClient;
use bizzy_core::auth::{EncryptedFileStore, SessionManager};
use bizzy_core::config::Config;
use chrono::Local;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, Flow};

/// Pre-fills the email prompt, ahead of the saved email
const ENV_EMAIL: &str = "BIZZY_EMAIL";

/// Log file name inside the cache directory
const LOG_FILE: &str = "bizzy.log";

/// Initialize the tracing subscriber for logging.
/// Logs go to a file because the terminal is the interactive surface.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

fn prompt(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for credentials until a login succeeds. `None` means the user gave up.
async fn login(session: &SessionManager) -> Result<Option<String>> {
    let mut default_email = std::env::var(ENV_EMAIL)
        .ok()
        .or_else(|| session.load_saved_identifier())
        .unwrap_or_default();

    loop {
        let label = if default_email.is_empty() {
            "Email: ".to_string()
        } else {
            format!("Email [{}]: ", default_email)
        };
        let Some(typed) = prompt(&label)? else {
            return Ok(None);
        };
        let email = if typed.is_empty() {
            default_email.clone()
        } else {
            typed
        };
        if email.is_empty() {
            return Ok(None);
        }

        let password = rpassword::prompt_password("Password: ")?;

        println!("Logging in...");
        match session.login_and_remember(&email, &password).await {
            Ok(_) => {
                println!("Login successful");
                return Ok(Some(email));
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                println!("{}", e.user_message());
                default_email = email;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let cache_dir = config.cache_dir()?;
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("Failed to create {}", cache_dir.display()))?;

    let _log_guard = init_tracing(&cache_dir);
    info!("Bizzy starting");

    let client = AuthClient::with_base_url(&config.base_url())?;
    let store = EncryptedFileStore::new(config.store_path()?, config.key_source());
    let session = SessionManager::new(Arc::new(client), Arc::new(store))
        .with_device_token(config.device_token())
        .with_login_timeout(config.login_timeout());

    let mut app = App::new(Local::now().date_naive());

    'session: loop {
        let Some(email) = login(&session).await? else {
            break;
        };
        println!("Signed in as {}. Type 'help' for commands.", email);

        loop {
            let Some(line) = prompt("> ")? else {
                break 'session;
            };
            let command = match commands::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(msg) => {
                    println!("{}", msg);
                    continue;
                }
            };

            match app.execute(command) {
                Ok((lines, flow)) => {
                    for line in lines {
                        println!("{}", line);
                    }
                    match flow {
                        Flow::Continue => {}
                        Flow::Quit => break 'session,
                        Flow::Logout => {
                            if let Err(e) = session.sign_out() {
                                warn!(error = %e, "Sign out failed");
                                println!("{}", e.user_message());
                            } else {
                                println!("Signed out");
                            }
                            continue 'session;
                        }
                    }
                }
                Err(e) => println!("{}", e.user_message()),
            }
        }
    }

    info!("Bizzy shutting down");
    Ok(())
}
