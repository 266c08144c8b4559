#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    ConfigGet,
    ClientConfigure,
    LanguagesList,
    Translate,
    HistoryList,
    HistorySave,
    HistoryClear,
    FileParse,
    FileTranslateAll,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "config.get" => Command::ConfigGet,
            "client.configure" => Command::ClientConfigure,
            "languages.list" => Command::LanguagesList,
            "translate" => Command::Translate,
            "history.list" => Command::HistoryList,
            "history.save" => Command::HistorySave,
            "history.clear" => Command::HistoryClear,
            "file.parse" => Command::FileParse,
            "file.translate_all" => Command::FileTranslateAll,
            _ => Command::Unknown,
        }
    }
}
