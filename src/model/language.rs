use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Language {
    pub code: String,

    #[serde(default)]
    pub name: String,
}
