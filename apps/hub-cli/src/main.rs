//! ContentHub CLI - log in through Naver or Kakao and call the backend with a
//! guarded session.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use hub_config::{init_logging, Config, Paths};
use session_guard::LoginProvider;
use tracing::debug;

/// ContentHub CLI.
#[derive(Parser)]
#[command(name = "contenthub")]
#[command(about = "ContentHub CLI for login and guarded API calls")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(long, global = true, env = "CONTENTHUB_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stored session
    Status,

    /// GET a backend path with the session attached
    Get {
        /// Backend path, e.g. /search
        path: String,
        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = parse_key_val)]
        query: Vec<(String, String)>,
    },

    /// Complete a provider login with the OAuth callback values
    Login {
        #[command(subcommand)]
        provider: LoginCommands,
    },

    /// Re-login from the session the backend still holds
    Restore {
        /// Provider to restore (defaults to the stored one)
        provider: Option<LoginProvider>,
    },

    /// Revoke the provider token and clear the session
    Logout,
}

#[derive(Subcommand)]
enum LoginCommands {
    /// Naver login callback
    Naver {
        #[arg(long)]
        code: String,
        #[arg(long)]
        state: String,
    },
    /// Kakao login callback
    Kakao {
        #[arg(long)]
        code: String,
    },
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let mut config = Config::load(&paths)?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    paths.ensure_dirs()?;
    init_logging(&config.log_level, &paths);
    debug!(backend_url = %config.backend_url, "starting contenthub");

    let format = cli.format;
    match cli.command {
        Commands::Status => commands::status(&paths, &config, &format).await,
        Commands::Get { path, query } => commands::get(&paths, &config, &path, &query, &format).await,
        Commands::Login { provider } => match provider {
            LoginCommands::Naver { code, state } => {
                commands::login_naver(&paths, &config, &code, &state, &format).await
            }
            LoginCommands::Kakao { code } => {
                commands::login_kakao(&paths, &config, &code, &format).await
            }
        },
        Commands::Restore { provider } => commands::restore(&paths, &config, provider, &format).await,
        Commands::Logout => commands::logout(&paths, &config, &format).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = run(cli).await {
        output::print_error(&e.to_string(), &format);
        std::process::exit(1);
    }
}
