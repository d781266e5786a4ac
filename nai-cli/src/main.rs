use clap::Parser;
use nai_core::config::{config_dir, Config, ConfigError};
use nai_core::itunes::ITunesClient;
use nai_core::search::SearchStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

mod ui;

/// Search the iTunes podcast directory from the terminal.
#[derive(Parser)]
#[command(name = "nai")]
struct Args {
    /// Term searched when the search screen opens (default: "technology").
    #[arg(long)]
    term: Option<String>,

    /// Base URL of the search directory.
    #[arg(long)]
    base_url: Option<String>,

    /// Go straight to the search screen.
    #[arg(long)]
    skip_intro: bool,

    /// Run the initial search, print the results and exit.
    #[arg(long)]
    once: bool,

    /// Write the effective configuration to ~/.nai/config.yaml before starting.
    #[arg(long)]
    save_config: bool,
}

impl Args {
    /// Flags take precedence over the loaded configuration.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(term) = &self.term {
            config.default_term = term.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
    }
}

/// Persist `config` as `config.yaml` under `dir`.
fn save_config(config: &Config, dir: &Path) -> Result<(), ConfigError> {
    config.save_to_yaml(dir)?;
    info!("Saved configuration to {}", dir.display());
    Ok(())
}

fn configure_logging() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout carries the results grid
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_target(false)
        .with_file(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() {
    configure_logging();
    let args = Args::parse();

    let mut config = Config::load();
    args.apply_overrides(&mut config);
    info!("nai starting (directory: {})", config.base_url);

    if args.save_config {
        let Some(dir) = config_dir() else {
            error!("Cannot save configuration: no home directory");
            std::process::exit(1);
        };
        if let Err(e) = save_config(&config, &dir) {
            error!("Failed to save configuration: {e}");
            std::process::exit(1);
        }
    }

    let client = ITunesClient::from_config(&config).unwrap_or_else(|e| {
        error!("Failed to create search client: {e}");
        std::process::exit(1);
    });
    let store = SearchStore::new(Arc::new(client));

    if args.once {
        ui::run_once(&store, &config.default_term).await;
        return;
    }

    let app = ui::App::new(store, config.default_term, args.skip_intro);
    if let Err(e) = app.run().await {
        error!("Terminal error: {e}");
        std::process::exit(1);
    }
}
