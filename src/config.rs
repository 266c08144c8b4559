use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::model::settings::{Settings, DEFAULT_SERVER_URL};

const APP_DIR: &str = "translate-core";
const HISTORY_FILE: &str = "history.json";
const SETTINGS_FILE: &str = "settings.json";

/// Values given on the command line. `None` means "not set, fall back".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub server_url: Option<String>,
    pub api_key: Option<String>,
}

/// Resolved configuration handed to every component at construction.
///
/// The environment is consulted only in [`CoreConfig::from_env`]; nothing
/// below the entry point reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub config_dir: PathBuf,
    pub server_url: String,
    pub api_key: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl CoreConfig {
    pub fn from_env(overrides: ConfigOverrides) -> Self {
        let data_dir = overrides
            .data_dir
            .clone()
            .unwrap_or_else(|| xdg_dir("XDG_DATA_HOME", ".local/share").join(APP_DIR));
        let config_dir = overrides
            .config_dir
            .clone()
            .unwrap_or_else(|| xdg_dir("XDG_CONFIG_HOME", ".config").join(APP_DIR));

        Self::resolve(data_dir, config_dir, overrides)
    }

    /// Builds a config rooted at explicit directories, still honouring the settings file.
    pub fn with_dirs(data_dir: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self::resolve(data_dir.into(), config_dir.into(), ConfigOverrides::default())
    }

    fn resolve(data_dir: PathBuf, config_dir: PathBuf, overrides: ConfigOverrides) -> Self {
        let settings = load_settings(&config_dir.join(SETTINGS_FILE));

        let server_url = overrides
            .server_url
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(settings.server_url);
        let api_key = overrides.api_key.unwrap_or(settings.api_key);

        CoreConfig {
            data_dir,
            config_dir,
            server_url: normalize_server_url(&server_url),
            api_key,
            source_lang: settings.source_lang,
            target_lang: settings.target_lang,
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }
}

/// Reads the shell's settings file. Missing or corrupt files give defaults.
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!("failed to read {}: {e}", path.display());
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&data) {
        Ok(s) => s,
        Err(e) => {
            warn!("failed to parse {}: {e}", path.display());
            Settings::default()
        }
    }
}

/// Strips trailing slashes; an empty URL means the public default endpoint.
pub fn normalize_server_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_SERVER_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn xdg_dir(var: &str, home_suffix: &str) -> PathBuf {
    if let Ok(dir) = std::env::var(var) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(home_suffix);
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
