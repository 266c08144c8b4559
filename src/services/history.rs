use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::model::history::HistoryEntry;

pub const MAX_HISTORY: usize = 100;

/// Most-recent-first log of past translations, rewritten in full on every save.
///
/// There is no locking: two processes saving at once can lose an entry.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absent or corrupt files read as an empty history.
    pub fn load(&self) -> Vec<HistoryEntry> {
        if !self.path.exists() {
            return Vec::new();
        }

        let data = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) => {
                warn!("[history] failed to read {}: {e}", self.path.display());
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&data) {
            Ok(v) => v,
            Err(e) => {
                warn!("[history] failed to parse {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    /// Prepends an entry and returns the resulting history length.
    pub fn save_entry(
        &self,
        source_lang: &str,
        target_lang: &str,
        source_text: &str,
        translated_text: &str,
    ) -> Result<usize> {
        let mut history = self.load();

        history.insert(
            0,
            HistoryEntry {
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
                source: source_text.to_string(),
                translation: translated_text.to_string(),
            },
        );
        history.truncate(MAX_HISTORY);

        let json = serde_json::to_string_pretty(&history).map_err(|e| self.write_error(e.into()))?;
        write_atomic(&self.path, json.as_bytes()).map_err(|e| self.write_error(e))?;

        debug!("[history] saved entry, {} total", history.len());
        Ok(history.len())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.write_error(e)),
        }
    }

    fn write_error(&self, source: io::Error) -> CoreError {
        CoreError::StorageWrite {
            path: self.path.clone(),
            source,
        }
    }
}

/// Writes a sibling temp file and renames it over `path`, so readers never
/// see a half-written history.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp, bytes)?;

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "history".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
