//! Configuration management for newsreel.
//!
//! Configuration is read from `~/.config/newsreel/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! The `NEWSAPI_KEY` environment variable overrides `api.api_key`.

pub mod api;
pub mod colors;
pub mod keybindings;

pub use api::{ApiConfig, AuthConfig, FeedConfig};
pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub auth: AuthConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, without creating it.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.api.apply_env();

        Ok(config)
    }

    /// Get the default config file path: `~/.config/newsreel/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("newsreel").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# newsreel configuration
#
# Colors can be specified as:
# - Names: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray, DarkGray,
#   LightRed, LightGreen, LightYellow, LightBlue, LightMagenta, LightCyan,
#   White, Reset
# - 256-color palette indexes: "208"
# - Hex: "#RRGGBB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[api]
base_url = "https://newsapi.org/v2"
# Leave empty and export NEWSAPI_KEY instead to keep the key out of this file
api_key = ""
language = "en"
# Headline pages are reused for this long before hitting the network again
cache_ttl_secs = 300
timeout_secs = 10

[feed]
page_size = 20
# all, general, business, entertainment, health, science, sports, technology
category = "general"
country = "us"

[auth]
# OAuth client id used for sign-in
client_id = ""

[colors]
# Focused borders, active tab, focused selection
accent = "Cyan"
# Unfocused borders and selection, status bar background
muted = "DarkGray"
text = "White"
source = "Green"
# Favorite marker, author, dates
highlight = "Yellow"
# URLs, read-later marker
link = "LightBlue"
error = "LightRed"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
next_pane = ["Tab"]
prev_pane = ["BackTab"]
next_tab = ["]", "Right"]
prev_tab = ["[", "Left"]

select = ["Enter"]
toggle_favorite = ["f"]
toggle_read_later = ["l"]
open_in_browser = ["o"]
refresh = ["R"]
retry = ["r"]
search = ["/"]
cycle_category = ["c"]
cycle_date_filter = ["d"]
switch_bookmark_list = ["b"]
toggle_maximize = ["m"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewsCategory;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.colors.accent, ratatui::style::Color::Cyan);
        let defaults = KeybindingConfig::default();
        assert_eq!(config.keybindings.quit, defaults.quit);
        assert_eq!(config.keybindings.prev_pane, defaults.prev_pane);
        assert_eq!(config.keybindings.refresh, defaults.refresh);
        assert_eq!(config.colors, ColorConfig::default());
        assert_eq!(config.api.cache_ttl_secs, 300);
        assert_eq!(config.feed.page_size, 20);
        assert_eq!(config.feed.category, NewsCategory::General);
        assert!(!config.auth.is_configured());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[colors]
accent = "#FF0000"

[feed]
category = "technology"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(
            config.colors.accent,
            ratatui::style::Color::Rgb(255, 0, 0)
        );
        assert_eq!(
            config.colors.muted,
            ratatui::style::Color::DarkGray
        );
        assert_eq!(config.feed.category, NewsCategory::Technology);
        assert_eq!(config.feed.country, "us");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");

        assert_eq!(config.colors.accent, ratatui::style::Color::Cyan);
        assert_eq!(config.api.base_url, api::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[feed]\npage_size = \"lots\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
