//! CLI argument parsing.
//!
//! Two entry conventions share one binary: `provision` reads credentials from
//! flags or the `DIRECTUS_ADMIN_*` environment, `bootstrap` takes them
//! positionally. `check` reads items back to confirm access.
use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_LOG_FILE, DEFAULT_SETTLE_MS, ENV_ADMIN_EMAIL, ENV_ADMIN_PASSWORD,
    ENV_ADMIN_TOKEN, ENV_BASE_URL,
};
use crate::schema::{LEGACY, PORTFOLIO};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "dprov",
    version,
    about = "Provision Directus collections, fields, permissions, and seed items",
    after_help = "Examples:\n  DIRECTUS_ADMIN_TOKEN=... dprov provision\n  dprov provision --email admin@example.com --password secret --json\n  dprov bootstrap <admin_token>\n  dprov bootstrap <email> <password>\n  dprov check --public",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Provision(ProvisionArgs),
    Bootstrap(BootstrapArgs),
    Check(CheckArgs),
}

impl Command {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Self::Provision(args) => &args.common,
            Self::Bootstrap(args) => &args.common,
            Self::Check(args) => &args.common,
        }
    }
}

/// Flags shared by every command.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Base URL of the Directus instance
    #[arg(long, env = ENV_BASE_URL, default_value = DEFAULT_BASE_URL)]
    pub url: String,

    /// Built-in schema name (portfolio, legacy) or path to a schema JSON file
    #[arg(long, value_name = "NAME|PATH")]
    pub schema: Option<String>,

    /// Append log lines to this file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Do not write a log file
    #[arg(long, conflicts_with = "log_file")]
    pub no_log_file: bool,

    /// Print the run report as JSON on stdout (console logs move to stderr)
    #[arg(long)]
    pub json: bool,
}

impl CommonArgs {
    pub fn log_file(&self) -> Option<&Path> {
        (!self.no_log_file).then_some(self.log_file.as_path())
    }

    pub fn schema_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.schema.as_deref().unwrap_or(default)
    }
}

#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// Static admin token (used as-is, no login)
    #[arg(long, env = ENV_ADMIN_TOKEN, hide_env_values = true)]
    pub token: Option<String>,

    /// Admin email for login
    #[arg(long, env = ENV_ADMIN_EMAIL)]
    pub email: Option<String>,

    /// Admin password for login
    #[arg(long, env = ENV_ADMIN_PASSWORD, hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Provision the schema using flag or environment credentials")]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Milliseconds to wait after collection creation before adding fields
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_SETTLE_MS)]
    pub settle_ms: u64,
}

impl ProvisionArgs {
    pub fn schema(&self) -> &str {
        self.common.schema_or(PORTFOLIO)
    }
}

#[derive(Parser, Debug)]
#[command(
    about = "Provision the schema with positional credentials: <token> or <email> <password>"
)]
pub struct BootstrapArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Admin token, or admin email followed by password
    #[arg(value_name = "TOKEN | EMAIL PASSWORD", num_args = 1..=2, required = true)]
    pub credentials: Vec<String>,

    /// Milliseconds to wait after collection creation before adding fields
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_SETTLE_MS)]
    pub settle_ms: u64,
}

impl BootstrapArgs {
    pub fn schema(&self) -> &str {
        self.common.schema_or(LEGACY)
    }

    /// Split positional credentials into (token, email, password).
    pub fn credential_parts(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        match self.credentials.as_slice() {
            [token] => (Some(token.as_str()), None, None),
            [email, password] => (None, Some(email.as_str()), Some(password.as_str())),
            _ => (None, None, None),
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Read items from every schema collection to confirm access")]
pub struct CheckArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Read anonymously to confirm public access (no credentials needed)
    #[arg(long)]
    pub public: bool,
}

impl CheckArgs {
    pub fn schema(&self) -> &str {
        self.common.schema_or(PORTFOLIO)
    }
}
