use crate::output::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lexi")]
#[command(about = "lexi - turn vocabulary digests into flashcards")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/lexicard/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Database path (overrides config file and environment)
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// LLM endpoint base URL (overrides config file and environment)
    #[arg(long, global = true)]
    pub llm_endpoint: Option<String>,

    /// LLM model name (overrides config file and environment)
    #[arg(long, global = true)]
    pub llm_model: Option<String>,

    /// AnkiConnect URL (overrides config file and environment)
    #[arg(long, global = true)]
    pub anki_url: Option<String>,
}

impl Cli {
    /// Effective log filter level; `--log-level` wins over `--verbose`
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::INFO,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline once for each digest file
    Ingest {
        /// Digest files to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Process even when the file is unchanged
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        stages: StageFlags,
    },

    /// Process existing digests, then watch the directory for changes
    Watch {
        /// Directory to watch (defaults to watch.directory from config)
        dir: Option<PathBuf>,

        #[command(flatten)]
        stages: StageFlags,
    },

    /// Generate cards for stored entries
    Enrich {
        /// Only entries from this book (repeatable)
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Regenerate and replace the card of one word
        #[arg(long, value_name = "WORD", conflicts_with = "sources")]
        force: Option<String>,
    },

    /// Push stored cards to the remote deck
    Push {
        /// Only cards of this source (repeatable; defaults to every source)
        #[arg(short, long = "source")]
        sources: Vec<String>,
    },

    /// Inspect or delete vocabulary entries
    #[command(subcommand)]
    Entries(EntriesCommands),

    /// Inspect the file ledger
    #[command(subcommand)]
    Files(FilesCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Skip optional pipeline stages
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct StageFlags {
    /// Skip enrichment
    #[arg(long)]
    pub no_enrich: bool,

    /// Skip the deck push
    #[arg(long)]
    pub no_push: bool,
}

#[derive(Subcommand, Debug)]
pub enum EntriesCommands {
    /// List stored entries
    List {
        /// Only entries recorded under this book
        #[arg(short, long)]
        book: Option<String>,
    },

    /// Show one entry and its card
    Show { word: String },

    /// Delete one entry
    Delete { word: String },
}

#[derive(Subcommand, Debug)]
pub enum FilesCommands {
    /// List tracked digest files
    List,

    /// Drop the ledger record of a file so it is processed again
    Forget { path: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new config file
    Init {
        /// Path for the config file (defaults to ~/.config/lexicard/config.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite existing config file
        #[arg(short = 'F', long)]
        force: bool,
    },

    /// Show the current effective configuration
    Show,
}
