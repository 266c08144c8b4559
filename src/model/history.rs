use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    #[serde(default)]
    pub source_lang: String,

    #[serde(default)]
    pub target_lang: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub translation: String,
}
