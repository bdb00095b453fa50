use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "tokenpair", version, about = "Inspect tokenpair credentials")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version.
    Version,

    /// Verify a credential and print its payload as JSON.
    Decode {
        /// Which issuer the credential came from.
        #[arg(long, value_enum)]
        kind: Kind,

        /// Signing key of that issuer.
        #[arg(long)]
        key: String,

        /// The encoded credential.
        token: String,
    },

    /// Print a fresh random signing key.
    IssueKey,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Access,
    Refresh,
}
