//! # Lexicard Configuration
//!
//! Layered configuration for the digest pipeline. Values are resolved with
//! the precedence `defaults < TOML file < environment < command-line`; the
//! last layer is applied by the CLI on top of [`LexicardConfig::load`].
//!
//! ```rust,no_run
//! use lexicard_config::LexicardConfig;
//!
//! let config = LexicardConfig::load(None)?;
//! println!("database at {}", config.database.path.display());
//! # Ok::<(), lexicard_config::ConfigError>(())
//! ```

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::ConfigError;
pub use loader::{default_config_path, ENV_VARS};
