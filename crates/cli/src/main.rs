use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use tootbridge_config::{TootbridgeConfig, discover_and_load, load_config, validate};

#[derive(Parser)]
#[command(name = "tootbridge", about = "IRC bot bridging channels to Mastodon accounts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (overrides discovery).
    #[arg(long, global = true, env = "TOOTBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to IRC and run the relay (default when no subcommand given).
    Run,
    /// Validate the config and probe each enabled Mastodon account.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => discover_and_load()?,
    };
    validate(&config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => tootbridge_irc::bot::run(config).await,
        Commands::Check => check(&config).await,
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

/// Probe every enabled channel account with `verify_credentials`.
async fn check(config: &TootbridgeConfig) -> anyhow::Result<()> {
    let mut failures = 0usize;

    for (channel, cfg) in &config.channels {
        if !cfg.bot_enabled {
            info!(channel, "skipped (bot_enabled = false)");
            continue;
        }
        let client = tootbridge_irc::handlers::api_client(cfg)?;
        match client.verify_credentials().await {
            Ok(account) => info!(channel, account = account.url, "credentials ok"),
            Err(e) => {
                failures += 1;
                error!(channel, error = %e, "credential check failed");
            },
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} channel account(s) failed the credential check");
    }
    info!("config ok");
    Ok(())
}
