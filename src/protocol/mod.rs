use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::model::entry::FileEntry;
use crate::parsers::{self, FileFormat};
use crate::services::batch;
use crate::services::client::TranslationClient;
use crate::services::history::HistoryStore;

mod command;
pub mod outbox;

use command::Command;
use outbox::{Outbox, Outgoing};

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn str_field<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn ok(id: &Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: &Value, e: &CoreError) -> String {
    json!({
        "id": id,
        "status": "error",
        "kind": e.kind(),
        "message": e.to_string()
    })
    .to_string()
}

fn bad_request(id: &Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "kind": "request",
        "message": message.into()
    })
    .to_string()
}

pub fn internal_error() -> String {
    json!({
        "status": "error",
        "kind": "internal",
        "message": "internal core error"
    })
    .to_string()
}

/// Shell-facing command handler.
///
/// Synchronous commands answer before `handle` returns. Network commands
/// return immediately and answer later from their worker thread; either way
/// the reply is posted to the outbox and never written directly.
pub struct Session {
    config: CoreConfig,
    client: TranslationClient,
    history: HistoryStore,
    outbox: Outbox,
    translate_seq: Arc<AtomicU64>,
}

impl Session {
    pub fn new(config: CoreConfig, outbox: Outbox) -> Result<Self> {
        let client = TranslationClient::new(&config.server_url, &config.api_key)?;
        let history = HistoryStore::new(config.history_path());

        info!("session ready, server {}", client.server_url());

        Ok(Session {
            config,
            client,
            history,
            outbox,
            translate_seq: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn handle(&mut self, input: &str) {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                self.send(bad_request(&Value::Null, "invalid json"));
                return;
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);

        debug!("cmd {cmd_str:?} id {id}");

        if let Some(reply) = self.dispatch(Command::from(cmd_str), &id, payload) {
            self.send(reply);
        }
    }

    fn send(&self, line: String) {
        let _ = self.outbox.send(Outgoing::Line(line));
    }

    /// `None` means the reply will be posted later by a worker.
    fn dispatch(&mut self, cmd: Command, id: &Value, payload: &Value) -> Option<String> {
        match cmd {
            Command::Ping => Some(ok(id, json!({ "message": "translate-core alive" }))),

            Command::ConfigGet => Some(ok(
                id,
                json!({
                    "server_url": self.client.server_url(),
                    "has_api_key": self.client.has_api_key(),
                    "source_lang": self.config.source_lang,
                    "target_lang": self.config.target_lang,
                    "data_dir": self.config.data_dir,
                    "history_path": self.history.path(),
                }),
            )),

            Command::ClientConfigure => Some(self.configure(id, payload)),

            Command::LanguagesList => {
                let outbox = self.outbox.clone();
                let id = id.clone();

                self.client.get_languages_async(move |result| {
                    let line = match result {
                        Ok(mut langs) => {
                            langs.sort_by(|a, b| a.name.cmp(&b.name));
                            ok(&id, json!({ "languages": langs }))
                        }
                        Err(e) => err(&id, &e),
                    };
                    let _ = outbox.send(Outgoing::Line(line));
                });
                None
            }

            Command::Translate => self.translate(id, payload),

            Command::HistoryList => Some(ok(id, json!({ "entries": self.history.load() }))),

            Command::HistorySave => {
                match self.history.save_entry(
                    str_field(payload, "source_lang"),
                    str_field(payload, "target_lang"),
                    str_field(payload, "source"),
                    str_field(payload, "translation"),
                ) {
                    Ok(count) => Some(ok(id, json!({ "count": count }))),
                    Err(e) => Some(err(id, &e)),
                }
            }

            Command::HistoryClear => match self.history.clear() {
                Ok(()) => Some(ok(id, json!({}))),
                Err(e) => Some(err(id, &e)),
            },

            Command::FileParse => {
                let path = str_field(payload, "path");
                if path.is_empty() {
                    return Some(bad_request(id, "payload.path is required"));
                }
                let untranslated_only = payload
                    .get("untranslated_only")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);

                let path = Path::new(path);
                match parsers::parse_file(path) {
                    Ok(entries) => {
                        let untranslated_count = entries.iter().filter(|e| e.untranslated).count();
                        let entries = if untranslated_only {
                            parsers::untranslated(entries)
                        } else {
                            entries
                        };
                        let format = match FileFormat::detect(path) {
                            FileFormat::Po => "po",
                            FileFormat::Ts => "ts",
                        };
                        Some(ok(
                            id,
                            json!({
                                "format": format,
                                "untranslated_count": untranslated_count,
                                "entries": entries,
                            }),
                        ))
                    }
                    Err(e) => Some(err(id, &e)),
                }
            }

            Command::FileTranslateAll => self.translate_all(id, payload),

            Command::Unknown => Some(bad_request(id, "unknown command")),
        }
    }

    fn configure(&mut self, id: &Value, payload: &Value) -> String {
        let server_url = payload
            .get("server_url")
            .and_then(|v| v.as_str())
            .unwrap_or(self.client.server_url())
            .to_string();
        let api_key = match payload.get("api_key").and_then(|v| v.as_str()) {
            Some(k) => k.to_string(),
            None => self.config.api_key.clone(),
        };

        match TranslationClient::new(&server_url, &api_key) {
            Ok(client) => {
                info!("client reconfigured for {}", client.server_url());
                self.config.server_url = client.server_url().to_string();
                self.config.api_key = api_key;
                self.client = client;
                ok(
                    id,
                    json!({
                        "server_url": self.client.server_url(),
                        "has_api_key": self.client.has_api_key(),
                    }),
                )
            }
            Err(e) => err(id, &e),
        }
    }

    fn translate(&self, id: &Value, payload: &Value) -> Option<String> {
        let text = str_field(payload, "text").trim();
        if text.is_empty() {
            return Some(bad_request(id, "payload.text is required"));
        }
        let (source, target) = self.langs(payload);

        // Completions may arrive out of order; `stale` tells the shell a
        // newer request was submitted before this one finished.
        let seq = self.translate_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.translate_seq);
        let outbox = self.outbox.clone();
        let id = id.clone();

        self.client.translate_async(text, source, target, move |result| {
            let stale = latest.load(Ordering::SeqCst) != seq;
            let line = match result {
                Ok(translation) => ok(
                    &id,
                    json!({ "translation": translation, "seq": seq, "stale": stale }),
                ),
                Err(e) => err(&id, &e),
            };
            let _ = outbox.send(Outgoing::Line(line));
        });
        None
    }

    fn translate_all(&self, id: &Value, payload: &Value) -> Option<String> {
        let entries: Vec<FileEntry> = match payload.get("entries") {
            Some(v) => match serde_json::from_value::<Vec<FileEntry>>(v.clone()) {
                Ok(v) => v,
                Err(e) => return Some(bad_request(id, format!("invalid payload.entries: {e}"))),
            },
            None => {
                let path = str_field(payload, "path");
                if path.is_empty() {
                    return Some(bad_request(id, "payload.path or payload.entries is required"));
                }
                match parsers::parse_file(Path::new(path)) {
                    Ok(v) => parsers::untranslated(v),
                    Err(e) => return Some(err(id, &e)),
                }
            }
        };
        let (source, target) = self.langs(payload);

        self.send(
            json!({
                "id": id,
                "status": "ok",
                "event": "started",
                "payload": { "total": entries.len() }
            })
            .to_string(),
        );

        let item_outbox = self.outbox.clone();
        let done_outbox = self.outbox.clone();
        let item_id = id.clone();
        let done_id = id.clone();

        batch::translate_all_async(
            &self.client,
            entries,
            source,
            target,
            move |item| {
                let line = match item.result {
                    Ok(translation) => json!({
                        "id": item_id,
                        "status": "ok",
                        "event": "progress",
                        "payload": {
                            "index": item.index,
                            "msgid": item.msgid,
                            "translation": translation,
                        }
                    }),
                    Err(e) => json!({
                        "id": item_id,
                        "status": "error",
                        "event": "progress",
                        "kind": e.kind(),
                        "message": e.to_string(),
                        "payload": { "index": item.index, "msgid": item.msgid }
                    }),
                };
                let _ = item_outbox.send(Outgoing::Line(line.to_string()));
            },
            move |report| {
                let line = json!({
                    "id": done_id,
                    "status": "ok",
                    "event": "done",
                    "payload": report
                });
                let _ = done_outbox.send(Outgoing::Line(line.to_string()));
            },
        );
        None
    }

    fn langs<'a>(&'a self, payload: &'a Value) -> (&'a str, &'a str) {
        let source = match str_field(payload, "source") {
            "" => self.config.source_lang.as_str(),
            s => s,
        };
        let target = match str_field(payload, "target") {
            "" => self.config.target_lang.as_str(),
            s => s,
        };
        (source, target)
    }
}
