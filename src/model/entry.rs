use serde::{Deserialize, Serialize};

/// One source string pulled out of a PO or TS file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub msgid: String,

    #[serde(default)]
    pub msgstr: String,

    #[serde(default)]
    pub untranslated: bool,
}

impl FileEntry {
    pub fn new(msgid: impl Into<String>, msgstr: impl Into<String>, untranslated: bool) -> Self {
        FileEntry {
            msgid: msgid.into(),
            msgstr: msgstr.into(),
            untranslated,
        }
    }
}
