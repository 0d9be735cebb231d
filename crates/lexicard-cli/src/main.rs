use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lexicard_cli::{
    cli::{Cli, Commands, ConfigCommands},
    commands,
    context::AppContext,
};
use lexicard_config::LexicardConfig;

const LOG_TARGETS: &[&str] = &[
    "lexicard_cli",
    "lexicard_config",
    "lexicard_core",
    "lexicard_parser",
    "lexicard_sqlite",
    "lexicard_enrichment",
    "lexicard_llm",
    "lexicard_deck",
    "lexicard_watch",
    "lexicard_pipeline",
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays parseable
    let level = cli.level_filter();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let targets: Vec<String> = LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect();
        EnvFilter::new(format!("warn,{}", targets.join(",")))
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Writing a config file must work even when the current one is broken
    if let Commands::Config(ConfigCommands::Init { path, force }) = cli.command {
        return commands::config::init(path, force);
    }

    let config = load_config(&cli)?;
    debug!(db = %config.database.path.display(), "Configuration loaded");

    if let Commands::Config(ConfigCommands::Show) = cli.command {
        return commands::config::show(&config, cli.format);
    }

    let context = AppContext::open(config)?;
    let format = cli.format;

    match cli.command {
        Commands::Ingest {
            paths,
            force,
            stages,
        } => commands::ingest::execute(&context, paths, force, stages, format).await,

        Commands::Watch { dir, stages } => commands::watch::execute(&context, dir, stages).await,

        Commands::Enrich { sources, force } => {
            commands::enrich::execute(&context, sources, force, format).await
        }

        Commands::Push { sources } => commands::push::execute(&context, sources, format).await,

        Commands::Entries(cmd) => commands::entries::execute(&context, cmd, format).await,

        Commands::Files(cmd) => commands::files::execute(&context, cmd, format).await,

        Commands::Config(_) => Ok(()),
    }
}

/// Defaults < file < environment < command line
fn load_config(cli: &Cli) -> Result<LexicardConfig> {
    let mut config = LexicardConfig::load(cli.config.clone()).context("Failed to load configuration")?;

    if let Some(path) = &cli.db_path {
        config.database.path = path.clone();
    }
    if let Some(endpoint) = &cli.llm_endpoint {
        config.llm.endpoint = endpoint.clone();
    }
    if let Some(model) = &cli.llm_model {
        config.llm.model = model.clone();
    }
    if let Some(url) = &cli.anki_url {
        config.deck.endpoint = url.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
