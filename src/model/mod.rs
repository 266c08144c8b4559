pub mod entry;
pub mod history;
pub mod language;
pub mod settings;
