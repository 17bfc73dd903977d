//! Configuration loader with dual-location support
//!
//! Loads configuration from:
//! 1. Default values
//! 2. User-level config: ~/.toolchat/toolchat.toml
//! 3. Project-level config: ./.toolchat/toolchat.toml
//!
//! Later files override earlier ones key by key; a project file that only
//! sets `[agent].mode` keeps the user's `[llm]` settings.

use crate::config::schema::ToolchatConfig;
use crate::error::{Result, ToolchatError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration directory name
pub const CONFIG_DIR: &str = ".toolchat";

/// Configuration file name
pub const CONFIG_FILE: &str = "toolchat.toml";

/// Path to the user-level config file
pub fn user_config_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
        .ok_or_else(|| ToolchatError::Config("Could not determine home directory".to_string()))
}

/// Path to the project-level config file
pub fn project_config_path() -> PathBuf {
    PathBuf::from(".").join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Loads and layers config files
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    project_config_path: PathBuf,
    explicit_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader over the standard locations
    pub fn new() -> Self {
        Self {
            user_config_path: user_config_path().ok(),
            project_config_path: project_config_path(),
            explicit_path: None,
        }
    }

    /// Loader over custom locations
    pub fn with_paths(user_config_path: Option<PathBuf>, project_config_path: PathBuf) -> Self {
        Self {
            user_config_path,
            project_config_path,
            explicit_path: None,
        }
    }

    /// Layer one more file on top, e.g. from `--config`; it must exist
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// Load, resolve environment variables and validate
    pub async fn load(&self) -> Result<ToolchatConfig> {
        info!("Loading configuration with defaults");
        let mut merged = match toml::Value::try_from(ToolchatConfig::default()) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) => return Err(ToolchatError::Config("Defaults did not render as a table".to_string())),
            Err(e) => return Err(ToolchatError::Config(format!("Failed to render defaults: {}", e))),
        };

        if let Some(path) = &self.user_config_path {
            if let Some(table) = Self::read_optional(path).await? {
                debug!(path = %path.display(), "Loaded user-level config");
                merge_tables(&mut merged, table);
            }
        }

        if let Some(table) = Self::read_optional(&self.project_config_path).await? {
            debug!(path = %self.project_config_path.display(), "Loaded project-level config");
            merge_tables(&mut merged, table);
        }

        if let Some(path) = &self.explicit_path {
            let table = Self::read_table(path).await?;
            debug!(path = %path.display(), "Loaded explicit config");
            merge_tables(&mut merged, table);
        }

        let mut config: ToolchatConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e| ToolchatError::Config(format!("Invalid configuration: {}", e)))?;
        config.resolve_env_vars();
        config.validate()?;

        info!(
            model = %config.llm.model,
            mode = %config.agent.mode,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load a single file on top of the defaults
    pub async fn load_from_path(&self, path: &Path) -> Result<ToolchatConfig> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            ToolchatError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ToolchatError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Missing files are skipped; unreadable or invalid ones are errors
    async fn read_optional(path: &Path) -> Result<Option<toml::Table>> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Config file not found, skipping");
            return Ok(None);
        }
        Self::read_table(path).await.map(Some)
    }

    async fn read_table(path: &Path) -> Result<toml::Table> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            ToolchatError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        content.parse::<toml::Table>().map_err(|e| {
            ToolchatError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively overlay `overlay` onto `base`; tables merge, everything else replaces
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// Write the default config file
///
/// An existing file is left alone unless `force` is set; returns whether
/// anything was written.
pub fn write_default_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ToolchatError::Config(format!("Failed to create directory: {}", e)))?;
    }

    let body = ToolchatConfig::default().to_toml()?;
    let content = format!(
        "# toolchat configuration\n\
         #\n\
         # Project-specific settings can be placed in ./{}/{}\n\
         # API keys: set [llm].api_key / [search].api_key (\"${{VAR}}\" is expanded)\n\
         # or export TOOLCHAT_API_KEY / TAVILY_API_KEY.\n\n{}",
        CONFIG_DIR, CONFIG_FILE, body
    );
    std::fs::write(path, content)?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(true)
}
