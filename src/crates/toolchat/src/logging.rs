//! Tracing subscriber setup
//!
//! Logs go to stderr so the chat transcript on stdout stays readable.
//! `RUST_LOG` takes precedence over `[logging].level`.

use crate::config::LoggingConfig;
use crate::error::{Result, ToolchatError};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` if set, otherwise the configured level
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            ToolchatError::Config(format!("Invalid logging.level '{}': {}", config.level, e))
        }),
    }
}

/// Install the global subscriber
///
/// `verbose` raises the default level to `debug` for this crate family.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let mut filter = env_filter(config)?;
    if verbose {
        for directive in ["toolchat=debug", "toolchat_prebuilt=debug", "llm=debug"] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.colored);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        "pretty" => builder.pretty().try_init(),
        _ => builder.compact().try_init(),
    };

    installed.map_err(|e| ToolchatError::Other(format!("Failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "toolchat=loudest".to_string(),
            ..LoggingConfig::default()
        };
        assert!(env_filter(&config).is_err());
    }

    #[test]
    fn test_default_level_accepted() {
        assert!(env_filter(&LoggingConfig::default()).is_ok());
    }
}
