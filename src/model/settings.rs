use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "https://libretranslate.com";

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_target_lang() -> String {
    "sv".to_string()
}

/// Settings file written by the shell. The core only reads it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_source_lang", alias = "source_language")]
    pub source_lang: String,

    #[serde(default = "default_target_lang", alias = "target_language")]
    pub target_lang: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server_url: default_server_url(),
            api_key: String::new(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
        }
    }
}
