//! remark: command-line client for LandmarkRemark.
//!
//! Leave a note at a place, then find notes left by yourself and others,
//! nearest first.

mod commands;
mod config;
mod offline;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use remark_core::{
    BoundaryPreference, FileSettingsStore, Operation, ScopeFilter, SettingsStore, UserMessage,
};
use remark_db::Database;

use crate::commands::Context;
use crate::config::CliConfig;
use crate::offline::OfflineStore;

#[derive(Parser, Debug)]
#[command(name = "remark")]
#[command(author, version, about = "Leave and find notes at places on the map")]
#[command(propagate_version = true)]
struct Cli {
    /// Use a local file instead of the landmark database
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Signup {
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Log in and remember the session
    Login {
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the remembered session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List landmarks, nearest first when a location is given
    List {
        #[command(flatten)]
        location: LocationArgs,

        /// Only show landmarks whose note or author contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// all, mine or others
        #[arg(long, default_value = "all")]
        scope: ScopeFilter,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Leave a note at a location
    Add {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Note text (at least 3 characters)
        #[arg(required = true, num_args = 1..)]
        note: Vec<String>,
    },

    /// Replace the note of one of your landmarks
    Edit {
        id: String,

        #[arg(required = true, num_args = 1..)]
        note: Vec<String>,

        #[command(flatten)]
        location: LocationArgs,
    },

    /// Delete one of your landmarks
    Delete { id: String },

    /// Show or set the search boundary (1km, 10km, 100km, planet)
    Boundary { value: Option<BoundaryPreference> },

    /// Apply database migrations
    Migrate,
}

impl Commands {
    fn operation(&self) -> Operation {
        match self {
            Commands::Signup { .. } => Operation::SignUp,
            Commands::Login { .. } => Operation::LogIn,
            Commands::Logout => Operation::LogOut,
            Commands::Add { .. } => Operation::Create,
            Commands::Edit { .. } => Operation::Update,
            Commands::Delete { .. } => Operation::Delete,
            Commands::Whoami
            | Commands::List { .. }
            | Commands::Boundary { .. }
            | Commands::Migrate => Operation::Fetch,
        }
    }

    fn is_local(&self) -> bool {
        matches!(self, Commands::Whoami | Commands::Boundary { .. })
    }
}

/// Current device position.
#[derive(Args, Debug, Clone, Copy)]
pub struct LocationArgs {
    /// Latitude of the current position
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the current position
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _file_guard = init_tracing();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "warn")
///
/// Console logs go to stderr so command output stays clean.
fn init_tracing() -> Option<WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("remark.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        subsystem = "cli",
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = CliConfig::from_env();
    let op = cli.command.operation();
    let settings: Arc<dyn SettingsStore> =
        Arc::new(FileSettingsStore::new(config.settings_path.clone()));
    let mut stdout = std::io::stdout().lock();

    let result = if cli.command.is_local() {
        commands::execute_local(settings.as_ref(), cli.command, &mut stdout).await
    } else if cli.offline {
        let store = OfflineStore::load(&config.offline_path).await?;
        let ctx = Context {
            landmarks: Arc::new(store.landmarks.clone()),
            auth: Arc::new(store.auth.clone()),
            settings,
        };
        let result = commands::execute(&ctx, cli.command, &mut stdout).await;
        store.persist().await?;
        result
    } else {
        match Database::connect_with_config(&config.database_url, config.pool.clone()).await {
            Ok(db) if matches!(cli.command, Commands::Migrate) => {
                match db.migrate().await {
                    Ok(()) => commands::print_migrated(&mut stdout),
                    Err(e) => Err(e),
                }
            }
            Ok(db) => {
                let ctx = Context {
                    landmarks: Arc::new(db.landmarks.clone()),
                    auth: Arc::new(db.users.clone()),
                    settings,
                };
                let result = commands::execute(&ctx, cli.command, &mut stdout).await;
                remark_db::log_pool_metrics(&db.pool);
                result
            }
            Err(e) => Err(e),
        }
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            warn!(
                subsystem = "cli",
                ?op,
                network = e.is_network(),
                error = %e,
                "Command failed"
            );
            eprintln!("{}", UserMessage::for_error(op, &e));
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("remark").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_negative_coordinates() {
        let cli = parse(&["add", "--lat", "-33.86", "--lon", "151.21", "Opera", "house"]);
        match cli.command {
            Commands::Add { lat, lon, note } => {
                assert_eq!(lat, -33.86);
                assert_eq!(lon, 151.21);
                assert_eq!(note, vec!["Opera", "house"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_options() {
        let cli = parse(&[
            "--offline", "list", "--lat", "1.5", "--lon", "-2", "--scope", "Mine", "-s", "cafe",
        ]);
        assert!(cli.offline);
        match cli.command {
            Commands::List {
                location,
                search,
                scope,
                json,
            } => {
                assert_eq!(location.lat, Some(1.5));
                assert_eq!(location.lon, Some(-2.0));
                assert_eq!(scope, ScopeFilter::Mine);
                assert_eq!(search.as_deref(), Some("cafe"));
                assert!(!json);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lat_requires_lon() {
        assert!(Cli::try_parse_from(["remark", "list", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn test_parse_boundary() {
        match parse(&["boundary", "100km"]).command {
            Commands::Boundary { value } => assert_eq!(value, Some(BoundaryPreference::HundredKm)),
            other => panic!("unexpected {:?}", other),
        }
        assert!(Cli::try_parse_from(["remark", "boundary", "5km"]).is_err());
    }

    #[test]
    fn test_operations() {
        assert_eq!(parse(&["logout"]).command.operation(), Operation::LogOut);
        assert_eq!(
            parse(&["delete", "abc"]).command.operation(),
            Operation::Delete
        );
        assert!(parse(&["whoami"]).command.is_local());
        assert!(!parse(&["list"]).command.is_local());
    }
}
