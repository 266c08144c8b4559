pub mod po;
pub mod ts;

use std::path::Path;

use crate::error::{CoreError, Result};
use crate::model::entry::FileEntry;
use crate::services::encoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Po,
    Ts,
}

impl FileFormat {
    /// `.ts` selects the Qt parser; everything else is treated as gettext.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ts") => FileFormat::Ts,
            _ => FileFormat::Po,
        }
    }
}

pub fn parse_file(path: &Path) -> Result<Vec<FileEntry>> {
    let decoded = encoding::read_text(path)?;

    match FileFormat::detect(path) {
        FileFormat::Po => Ok(po::parse(&decoded.text)),
        FileFormat::Ts => ts::parse(&decoded.text).map_err(|message| CoreError::Parse {
            path: path.to_path_buf(),
            message,
        }),
    }
}

pub fn untranslated(entries: Vec<FileEntry>) -> Vec<FileEntry> {
    entries.into_iter().filter(|e| e.untranslated).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn detects_format_by_extension() {
        assert_eq!(FileFormat::detect(Path::new("app_sv.ts")), FileFormat::Ts);
        assert_eq!(FileFormat::detect(Path::new("APP_SV.TS")), FileFormat::Ts);
        assert_eq!(FileFormat::detect(Path::new("sv.po")), FileFormat::Po);
        assert_eq!(FileFormat::detect(Path::new("messages.pot")), FileFormat::Po);
        assert_eq!(FileFormat::detect(Path::new("README")), FileFormat::Po);
    }

    #[test]
    fn parse_file_dispatches_and_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();

        let po = dir.path().join("sv.po");
        fs::write(&po, "msgid \"Hello\"\nmsgstr \"\"\n\nmsgid \"Hi\"\nmsgstr \"Hej\"\n").unwrap();
        let entries = parse_file(&po).unwrap();
        assert_eq!(untranslated(entries), vec![FileEntry::new("Hello", "", true)]);

        let broken = dir.path().join("broken.ts");
        fs::write(&broken, "<TS><message>").unwrap();
        match parse_file(&broken) {
            Err(CoreError::Parse { path, .. }) => assert_eq!(path, broken),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
