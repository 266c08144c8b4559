use std::sync::OnceLock;

use regex::Regex;

use crate::model::entry::FileEntry;

fn block_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\n+").expect("valid block separator pattern"))
}

// Quoted string with escaped characters: msgid "say \"hi\""
fn msgid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"msgid\s+"((?:[^"\\]|\\.)*)""#).expect("valid msgid pattern")
    })
}

fn msgstr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"msgstr\s+"((?:[^"\\]|\\.)*)""#).expect("valid msgstr pattern")
    })
}

/// Best-effort gettext extraction: first `msgid`/`msgstr` pair of every
/// blank-line separated block. Escapes are kept as written.
pub fn parse(text: &str) -> Vec<FileEntry> {
    let text = text.replace("\r\n", "\n");
    let mut entries = Vec::new();

    for block in block_separator().split(&text) {
        let msgid = match msgid_re().captures(block).and_then(|c| c.get(1)) {
            Some(m) => m.as_str(),
            None => continue,
        };

        // Empty msgid is the header block
        if msgid.is_empty() {
            continue;
        }

        let msgstr = msgstr_re()
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or("");

        entries.push(FileEntry::new(msgid, msgstr, msgstr.is_empty()));
    }

    entries
}
