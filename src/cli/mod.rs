//! CLI module for Watchtower
//!
//! Command-line interface definitions and handlers for the Watchtower
//! monitoring client.
//!
//! # Commands
//!
//! - `signup` / `login` / `logout` / `whoami` - Account and session
//! - `services` - List or register monitored services
//! - `watch` - Live analytics for one service
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! watchtower login --email me@example.com --password hunter2
//! watchtower services add --host 10.0.0.3 --port 7000 --name checkout \
//!     --metric ACTIVE_USERS --metric MEMORY_USAGE
//! watchtower watch 7
//! ```

pub mod auth;
pub mod completions;
pub mod config;
pub mod context;
pub mod output;
pub mod services;
pub mod watch;

pub use completions::handle_completions;
pub use config::{handle_config_init, load_config_with_overrides};
pub use context::AppContext;

use crate::api::MetricKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Watchtower - service monitoring from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "watchtower",
    version,
    about = "Terminal client for the Watchtower service-monitoring dashboard"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "watchtower.toml")]
    pub config: PathBuf,

    /// Override the server's HTTP API URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Override the push channel URL
    #[arg(long, global = true)]
    pub push_url: Option<String>,

    /// Override the session file location
    #[arg(long, global = true)]
    pub session: Option<PathBuf>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Signup(SignupArgs),
    /// Log in and remember the identity
    Login(LoginArgs),
    /// Forget the stored identity
    Logout,
    /// Show the logged-in identity
    Whoami(WhoamiArgs),
    /// List or register services
    #[command(subcommand)]
    Services(ServicesCommands),
    /// Stream live metrics for a service
    Watch(WatchArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub email: String,

    #[arg(short, long, env = "WATCHTOWER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub email: String,

    #[arg(short, long, env = "WATCHTOWER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ServicesCommands {
    /// List services registered by the logged-in user
    List(ServicesListArgs),
    /// Register a new service
    Add(ServicesAddArgs),
}

#[derive(Args, Debug)]
pub struct ServicesListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ServicesAddArgs {
    /// Host or IP of the service
    #[arg(long)]
    pub host: Option<String>,

    /// Port serving /metrics/
    #[arg(short, long)]
    pub port: Option<String>,

    /// Display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Metric to collect (repeatable): REQUEST_COUNT, ERROR_COUNT, MEMORY_USAGE,
    /// ACTIVE_USERS, REQUEST_LATENCY, RESPONSE_SIZE
    #[arg(short, long = "metric")]
    pub metrics: Vec<MetricKind>,

    /// Output the refreshed list as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Service ID
    pub id: String,

    /// Stop after this many metrics frames
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub frames: Option<u64>,

    /// Emit one JSON snapshot per frame
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "watchtower.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
