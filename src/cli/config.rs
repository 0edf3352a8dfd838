//! Config loading and the `config init` command

use crate::cli::{ConfigInitArgs, GlobalArgs};
use crate::config::WatchtowerConfig;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../watchtower.example.toml");

/// Load configuration with CLI overrides
///
/// A missing config file is not an error; defaults are used instead.
pub fn load_config_with_overrides(
    args: &GlobalArgs,
) -> Result<WatchtowerConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        WatchtowerConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        WatchtowerConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(ref url) = args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(ref url) = args.push_url {
        config.push.url = url.clone();
    }
    if let Some(ref path) = args.session {
        config.session.path = path.clone();
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Handle `watchtower config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<String, Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    Ok(format!(
        "✓ Configuration file created: {}\n  Edit this file to point at your Watchtower server.",
        args.output.display()
    ))
}
