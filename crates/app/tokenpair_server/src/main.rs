//! tokenpair HTTP server binary.
//!
//! Serves the login and refresh endpoints over PostgreSQL, or over in-process
//! stores seeded from the command line when `--in-memory` is given.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokenpair_api::AppState;
use tokenpair_api::config::ApiConfig;
use tokenpair_core::auth::AuthService;
use tokenpair_core::models::auth::User;
use tokenpair_core::notify::smtp::SmtpNotifier;
use tokenpair_core::notify::{AnomalyNotifier, LogNotifier};
use tokenpair_core::store::memory::{MemoryAuthRecordStore, MemoryUserLookup};
use tokenpair_core::store::postgres::{PgAuthRecordStore, PgUserLookup};
use tracing::info;

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "tokenpair_server", about = "tokenpair credential server")]
struct Args {
    /// Address to listen on. Overrides `BIND_ADDR`.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3100")]
    bind: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/tokenpair"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Keep users and auth records in process instead of PostgreSQL.
    #[arg(long, default_value_t = false)]
    in_memory: bool,

    /// User for `--in-memory` mode as `ID:EMAIL`. Repeatable.
    #[arg(long = "user", value_parser = parse_user)]
    users: Vec<User>,
}

fn parse_user(raw: &str) -> Result<User, String> {
    let (id, email) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected ID:EMAIL, got '{raw}'"))?;
    let id = id
        .trim()
        .parse()
        .map_err(|e| format!("invalid user id '{id}': {e}"))?;
    Ok(User {
        id,
        email: email.trim().to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,tokenpair_api=debug,tokenpair_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env()?;
    config.bind_addr = args.bind.clone();
    config.pg_connection_url = args.database_url.clone();
    info!(bind = %config.bind_addr, in_memory = args.in_memory, auth = ?config.auth, "starting tokenpair_server");

    let notifier: Arc<dyn AnomalyNotifier> = match &config.smtp {
        Some(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "emailing origin-change warnings");
            Arc::new(SmtpNotifier::new(smtp)?)
        }
        None => {
            info!("SMTP_HOST not set, origin-change warnings are only logged");
            Arc::new(LogNotifier)
        }
    };

    let service = if args.in_memory {
        info!(users = args.users.len(), "using in-memory stores");
        AuthService::new(
            &config.auth,
            Arc::new(MemoryUserLookup::new(args.users)),
            Arc::new(MemoryAuthRecordStore::new()),
            notifier,
        )
    } else {
        info!(max_connections = args.max_connections, "configuring connection pool");
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&config.pg_connection_url)
            .await?;

        info!("running database migrations");
        tokenpair_api::migrate(&pool).await?;

        AuthService::new(
            &config.auth,
            Arc::new(PgUserLookup::new(pool.clone())),
            Arc::new(PgAuthRecordStore::new(pool)),
            notifier,
        )
    };

    let state = AppState { service };
    let app = tokenpair_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_user_splits_id_and_email() {
        let user = parse_user("42:a@example.com").unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.email, "a@example.com");
    }

    #[test]
    fn parse_user_rejects_bad_input() {
        assert!(parse_user("a@example.com").is_err());
        assert!(parse_user("x:a@example.com").is_err());
    }

    #[test]
    fn args_accept_repeated_users() {
        let args = Args::try_parse_from([
            "tokenpair_server",
            "--in-memory",
            "--user",
            "1:a@example.com",
            "--user",
            "2:b@example.com",
        ])
        .unwrap();
        assert!(args.in_memory);
        assert_eq!(args.users.len(), 2);
    }
}
