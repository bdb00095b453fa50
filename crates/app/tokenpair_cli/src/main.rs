// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands, Kind};
use tokenpair_core::config::{DEFAULT_ISSUER, generate_key};
use tokenpair_core::token::access::AccessIssuer;
use tokenpair_core::token::refresh::RefreshIssuer;

mod cli;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();

    match &args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::Decode { kind, key, token } => decode(*kind, key, token)?,
        Commands::IssueKey => println!("{}", generate_key()),
    }

    Ok(())
}

/// Lifetimes only matter when issuing, so decoding uses placeholders.
fn decode(kind: Kind, key: &str, token: &str) -> Result<()> {
    let payload = match kind {
        Kind::Access => {
            let issuer = AccessIssuer::new(DEFAULT_ISSUER, key.as_bytes(), 1);
            serde_json::to_string_pretty(&issuer.decode(token)?.payload)?
        }
        Kind::Refresh => {
            let issuer = RefreshIssuer::new(DEFAULT_ISSUER, key.as_bytes(), 1);
            let refresh = issuer.decode(token)?;
            if refresh.payload.is_expired_at(chrono::Utc::now().timestamp()) {
                log::warn!("refresh credential {} has expired", refresh.payload.id);
            }
            serde_json::to_string_pretty(&refresh.payload)?
        }
    };
    println!("{payload}");
    Ok(())
}
