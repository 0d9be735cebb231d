use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::output::{print_json, OutputFormat};
use lexicard_config::{default_config_path, LexicardConfig};

/// Initialize a new config file
pub fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = match path {
        Some(path) => path,
        None => default_config_path().context("Could not determine config file path")?,
    };

    if config_path.exists() && !force {
        println!(
            "{} Config file already exists at: {}",
            "Error:".red().bold(),
            config_path.display()
        );
        println!("Use {} to overwrite", "--force".yellow());
        return Ok(());
    }

    LexicardConfig::create_example(&config_path)?;

    println!(
        "{} Created config file at: {}",
        "Success:".green().bold(),
        config_path.display()
    );
    println!(
        "\n{}",
        "Edit this file to set your LLM endpoint and deck settings.".dimmed()
    );
    Ok(())
}

/// Show the current effective configuration
pub fn show(config: &LexicardConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config)?,
        OutputFormat::Text => println!("{}", config.to_toml_string()?),
    }
    Ok(())
}
