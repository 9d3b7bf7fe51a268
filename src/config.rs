//! TOML-based configuration system.
//!
//! Loads settings from a `config.toml` file, falling back to the built-in
//! startup values. Every struct implements `Default` so a missing or partial
//! config file produces the stock behavior.
//!
//! ## Config file search order
//!
//! 1. `LANTERNE_CONFIG` environment variable (explicit override)
//! 2. Next to the executable (`<exe_dir>/config.toml`)
//! 3. Per-OS user data directory (see [`crate::paths::user_data_dir`])
//! 4. Current working directory (`./config.toml`)
//! 5. No file found → `Config::default()`

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::paths;

// ─────────────────────────────────────────────────────────────────────────────
// Config structs
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub window: WindowConfig,
    pub chrome: ChromeConfig,
    pub search: SearchConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
    pub features: FeatureConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub default_url: String,
    pub window_title: String,
    /// Locale passed to the engine and used for the error page `lang`.
    pub locale: String,
}

/// Window dimensions and page background.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    /// RGBA, 0–255.
    pub background_color: [u8; 4],
}

/// Toolbar appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    pub height: u32,
    pub font_size: f32,
    pub text_left_pad: f32,
    pub bar_margin: f32,
    pub bar_h_pad: f32,
    pub button_width: f32,
    /// Font file, relative to the resources directory.
    pub font: String,
    pub colors: ChromeColors,
}

/// RGBA colors for the toolbar UI (values 0.0–1.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeColors {
    pub background: [f32; 4],
    pub background_focused: [f32; 4],
    pub text: [f32; 4],
    pub text_disabled: [f32; 4],
    pub cursor: [f32; 4],
    pub bar_background: [f32; 4],
    pub bar_border: [f32; 4],
    pub button_hover: [f32; 4],
    pub menu_background: [f32; 4],
    pub menu_highlight: [f32; 4],
    pub loading: [f32; 4],
}

/// Search engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub engine_url: String,
}

/// Engine startup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Servo profile directory (`Opts::config_dir`).
    pub user_data_dir: PathBuf,
    pub remote_debugging_port: u16,
    /// Run page content in separate processes.
    pub multiprocess: bool,
    /// Maximum layout threads. 0 = auto-detect from CPU count.
    pub layout_threads: i64,
    /// In-memory HTTP cache size. Servo keeps no disk cache.
    pub cache_size: i64,
    /// User-agent string. Empty = engine default.
    pub user_agent: String,
    /// Pre-cache GPU shaders at startup.
    pub precache_shaders: bool,
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file, appended to. `None` disables file output.
    pub file: Option<PathBuf>,
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

/// Per-browser web feature flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// `navigator.clipboard`.
    pub javascript_access_clipboard: bool,
    /// `copy`/`cut`/`paste` events.
    pub javascript_dom_paste: bool,
    /// `localStorage` and `sessionStorage`. Servo has no switch for them, a
    /// page script hides them when disabled.
    pub local_storage: bool,
    /// IndexedDB.
    pub databases: bool,
    /// WebGL 2.
    pub webgl: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Default impls: built-in startup values
// ─────────────────────────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_url: "https://www.google.com".to_string(),
            window_title: "Lanterne".to_string(),
            locale: "en-US".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            background_color: [255, 255, 255, 255],
        }
    }
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            height: 40,
            font_size: 16.0,
            text_left_pad: 12.0,
            bar_margin: 6.0,
            bar_h_pad: 8.0,
            button_width: 32.0,
            font: "fonts/Inter-Regular.ttf".to_string(),
            colors: ChromeColors::default(),
        }
    }
}

impl Default for ChromeColors {
    fn default() -> Self {
        Self {
            background: [0.17, 0.17, 0.17, 1.0],
            background_focused: [0.23, 0.23, 0.23, 1.0],
            text: [0.93, 0.93, 0.93, 1.0],
            text_disabled: [0.45, 0.45, 0.45, 1.0],
            cursor: [1.0, 1.0, 1.0, 1.0],
            bar_background: [0.13, 0.13, 0.13, 1.0],
            bar_border: [0.3, 0.3, 0.3, 1.0],
            button_hover: [0.28, 0.28, 0.28, 1.0],
            menu_background: [0.2, 0.2, 0.2, 0.98],
            menu_highlight: [0.0, 0.4, 0.8, 1.0],
            loading: [0.0, 0.4, 0.8, 1.0],
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine_url: "https://www.google.com/search?q=".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_data_dir: PathBuf::from("./user_data"),
            remote_debugging_port: 9222,
            multiprocess: false,
            layout_threads: 0,
            cache_size: 50_000,
            user_agent: String::new(),
            precache_shaders: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("./lanterne_debug.log")),
            level: "info".to_string(),
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            javascript_access_clipboard: true,
            javascript_dom_paste: true,
            local_storage: true,
            databases: true,
            webgl: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config loading and saving
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of [`Config::load`], reported once logging is up.
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
    Invalid { path: PathBuf, error: String },
    Unreadable { path: PathBuf, error: io::Error },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            Self::File(path) => info!(path = %path.display(), "Configuration loaded"),
            Self::Defaults => info!("No config file found, using defaults"),
            Self::Invalid { path, error } => {
                warn!(path = %path.display(), %error, "Invalid config, using defaults")
            }
            Self::Unreadable { path, error } => {
                warn!(path = %path.display(), %error, "Cannot read config, using defaults")
            }
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file. Never fails: returns defaults
    /// if no file is found or if parsing fails.
    ///
    /// Runs before the subscriber exists, so the outcome is returned rather
    /// than logged.
    pub fn load() -> (Self, ConfigSource) {
        match find_config_path() {
            Some(path) => Self::load_from(path),
            None => (Config::default(), ConfigSource::Defaults),
        }
    }

    fn load_from(path: PathBuf) -> (Self, ConfigSource) {
        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(config) => (config, ConfigSource::File(path)),
                Err(e) => (
                    Config::default(),
                    ConfigSource::Invalid {
                        path,
                        error: e.to_string(),
                    },
                ),
            },
            Err(error) => (Config::default(), ConfigSource::Unreadable { path, error }),
        }
    }

    /// Saves configuration to the per-OS user data directory.
    pub fn save(&self) -> io::Result<PathBuf> {
        let path = save_path();
        self.save_to(&path)?;
        Ok(path)
    }

    fn save_to(&self, path: &std::path::Path) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, content)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Background color as normalized RGBA.
    pub fn background_rgba(&self) -> [f32; 4] {
        self.window.background_color.map(|c| f32::from(c) / 255.0)
    }
}

/// Searches for a config file in the standard locations.
fn find_config_path() -> Option<PathBuf> {
    // 1. Explicit env var override
    if let Ok(path) = std::env::var("LANTERNE_CONFIG") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
    }

    // 2. Next to the executable
    if let Some(dir) = paths::application_dir() {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 3. User data directory
    if let Some(dir) = paths::user_data_dir() {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 4. Current working directory
    let p = PathBuf::from("config.toml");
    if p.is_file() {
        return Some(p);
    }

    None
}

/// Returns the save path for the config file.
fn save_path() -> PathBuf {
    paths::user_data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_startup_values() {
        let c = Config::default();
        assert_eq!(c.general.default_url, "https://www.google.com");
        assert_eq!(c.general.window_title, "Lanterne");
        assert_eq!(c.general.locale, "en-US");
        assert_eq!(c.window.width, 1280);
        assert_eq!(c.window.height, 800);
        assert_eq!(c.window.background_color, [255, 255, 255, 255]);
        assert_eq!(c.engine.user_data_dir, PathBuf::from("./user_data"));
        assert_eq!(c.engine.remote_debugging_port, 9222);
        assert_eq!(c.engine.cache_size, 50_000);
        assert!(!c.engine.multiprocess);
        assert_eq!(c.logging.file, Some(PathBuf::from("./lanterne_debug.log")));
        assert_eq!(c.logging.level, "info");
        assert!(c.features.webgl);
        assert!(c.features.local_storage);
    }

    #[test]
    fn test_empty_toml_returns_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.chrome.height, 40);
        assert_eq!(config.engine.remote_debugging_port, 9222);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
[window]
width = 1920

[engine]
remote_debugging_port = 9333
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.window.height, 800); // default
        assert_eq!(config.engine.remote_debugging_port, 9333);
        assert!(!config.engine.multiprocess); // default
    }

    #[test]
    fn test_color_arrays_parse() {
        let toml = r#"
[chrome.colors]
background = [0.1, 0.2, 0.3, 1.0]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.chrome.colors.background, [0.1, 0.2, 0.3, 1.0]);
        // Other colors remain default
        assert_eq!(config.chrome.colors.text, [0.93, 0.93, 0.93, 1.0]);
    }

    #[test]
    fn test_background_rgba_normalized() {
        let mut config = Config::default();
        assert_eq!(config.background_rgba(), [1.0, 1.0, 1.0, 1.0]);
        config.window.background_color = [0, 51, 255, 0];
        assert_eq!(config.background_rgba(), [0.0, 0.2, 1.0, 0.0]);
    }

    #[test]
    fn test_full_toml_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.window.width, config.window.width);
        assert_eq!(deserialized.chrome.height, config.chrome.height);
        assert_eq!(deserialized.logging.file, config.logging.file);
        assert_eq!(deserialized.search.engine_url, config.search.engine_url);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[general]\nlocale = \"fr-FR\"\n").unwrap();
        let (config, source) = Config::load_from(path.clone());
        assert_eq!(config.general.locale, "fr-FR");
        assert!(matches!(source, ConfigSource::File(p) if p == path));
    }

    #[test]
    fn test_load_invalid_falls_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[window]\nwidth = \"wide\"\n").unwrap();
        let (config, source) = Config::load_from(path);
        assert_eq!(config.window.width, 1280);
        assert!(matches!(source, ConfigSource::Invalid { .. }));
    }

    #[test]
    fn test_load_unreadable_falls_back() {
        let tmp = tempfile::tempdir().unwrap();
        let (config, source) = Config::load_from(tmp.path().join("missing.toml"));
        assert_eq!(config.general.window_title, "Lanterne");
        assert!(matches!(source, ConfigSource::Unreadable { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.window.height = 600;
        config.save_to(&path).unwrap();
        let (loaded, _) = Config::load_from(path);
        assert_eq!(loaded.window.height, 600);
    }

    #[test]
    fn test_save_path_not_empty() {
        let path = save_path();
        assert!(!path.as_os_str().is_empty());
    }
}
