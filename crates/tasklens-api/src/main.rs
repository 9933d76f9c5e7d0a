use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tasklens_api::Server;
use tasklens_core::{ConfigManager, Settings};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tasklens")]
#[command(about = "TaskLens - task and context tracking with rule-based suggestions", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding default.toml, {env}.toml and local.toml
    #[arg(long, env = "TASKLENS_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Environment name used to pick the {env}.toml layer
    #[arg(long)]
    env: Option<String>,

    /// Override server.host
    #[arg(long)]
    host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the JSON schema of the settings file and exit
    #[arg(long)]
    print_schema: bool,
}

fn init_tracing(settings: &Settings) {
    let level = &settings.logging.level;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("tasklens_api={level},tasklens_core={level},tower_http={level}").into());

    let registry = tracing_subscriber::registry().with(filter);
    if settings.logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_schema {
        let schema = serde_json::to_string_pretty(&Settings::json_schema())?;
        println!("{}", schema);
        return Ok(());
    }

    let manager = ConfigManager::load(cli.config_dir, cli.env).context("loading settings")?;
    let config_dir = manager.config_dir().to_path_buf();
    let mut settings = manager.into_settings();
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    settings.validate()?;

    init_tracing(&settings);
    info!(config_dir = %config_dir.display(), "Using config directory");
    info!(env = %settings.env, "Starting TaskLens");

    Server::new(settings).run().await?;
    Ok(())
}
