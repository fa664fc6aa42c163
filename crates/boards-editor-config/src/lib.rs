use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides the default config location
pub const CONFIG_PATH_ENV: &str = "BOARDS_EDITOR_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {config_path}: {reason}")]
    ConfigInvalid { config_path: PathBuf, reason: String },
}

/// Which modifier the shortcuts use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformSetting {
    /// Follow the operating system
    #[default]
    Auto,
    Mac,
    Other,
}

/// How people are named in the mention popover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameDisplaySetting {
    #[default]
    Username,
    Nickname,
    FullName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub save_on_enter: bool,
    pub show_toolbar: bool,
    pub history_limit: usize,
    pub platform: PlatformSetting,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            save_on_enter: false,
            show_toolbar: true,
            history_limit: 100,
            platform: PlatformSetting::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionSettings {
    pub debounce_ms: u64,
    pub member_limit: usize,
    pub emoji_limit: usize,
    pub name_display: NameDisplaySetting,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            member_limit: 10,
            emoji_limit: 20,
            name_display: NameDisplaySetting::Username,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorSettings,
    pub suggestions: SuggestionSettings,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config
            .validate()
            .map_err(|reason| ConfigError::ConfigInvalid {
                config_path: config_path.to_path_buf(),
                reason,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    /// `$BOARDS_EDITOR_CONFIG` if set, else `~/.config/boards-editor/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(custom) = std::env::var(CONFIG_PATH_ENV)
            && !custom.is_empty()
        {
            let custom = PathBuf::from(custom);
            return Self::expand_path(&custom).unwrap_or(custom);
        }
        let config_dir = shellexpand::tilde("~/.config/boards-editor");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.editor.history_limit == 0 {
            return Err("editor.history_limit must be at least 1".to_string());
        }
        if self.suggestions.member_limit == 0 {
            return Err("suggestions.member_limit must be at least 1".to_string());
        }
        if self.suggestions.emoji_limit == 0 {
            return Err("suggestions.emoji_limit must be at least 1".to_string());
        }
        Ok(())
    }
}
