use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::normalize_server_url;
use crate::error::{CoreError, Result};
use crate::model::language::Language;
use crate::services::task::{self, Task};

const LANGUAGES_TIMEOUT_SECS: u64 = 15;
const TRANSLATE_TIMEOUT_SECS: u64 = 30;
const ERROR_SNIPPET_CHARS: usize = 400;

/// Blocking client for the translation server.
///
/// Clones share the underlying connection pool, so a clone is moved into
/// each background worker.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    http: Client,
    server_url: String,
    api_key: String,
}

impl TranslationClient {
    pub fn new(server_url: &str, api_key: &str) -> Result<Self> {
        let http = Client::builder().build()?;

        Ok(TranslationClient {
            http,
            server_url: normalize_server_url(server_url),
            api_key: api_key.trim().to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn get_languages(&self) -> Result<Vec<Language>> {
        let url = format!("{}/languages", self.server_url);
        debug!("GET {url}");

        let req = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(LANGUAGES_TIMEOUT_SECS));
        let value = send_json(req)?;

        serde_json::from_value(value)
            .map_err(|e| CoreError::Network(format!("unexpected language list: {e}")))
    }

    /// Returns `""` when the server answers without a `translatedText` field.
    pub fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = format!("{}/translate", self.server_url);
        debug!("POST {url} ({source} -> {target}, {} chars)", text.chars().count());

        let body = self.translate_body(text, source, target);
        let req = self
            .http
            .post(&url)
            .json(&body)
            .timeout(Duration::from_secs(TRANSLATE_TIMEOUT_SECS));
        let value = send_json(req)?;

        Ok(value
            .get("translatedText")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .to_string())
    }

    fn translate_body(&self, text: &str, source: &str, target: &str) -> Value {
        let mut body = json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text"
        });

        if !self.api_key.is_empty() {
            body["api_key"] = Value::String(self.api_key.clone());
        }

        body
    }

    /// Runs [`translate`](Self::translate) on a new thread and hands the
    /// outcome to `on_done` exactly once.
    pub fn translate_async<F>(&self, text: &str, source: &str, target: &str, on_done: F)
    where
        F: FnOnce(Result<String>) + Send + 'static,
    {
        let client = self.clone();
        let (text, source, target) = (text.to_string(), source.to_string(), target.to_string());

        thread::spawn(move || {
            let result = client.translate(&text, &source, &target);
            on_done(result);
        });
    }

    pub fn get_languages_async<F>(&self, on_done: F)
    where
        F: FnOnce(Result<Vec<Language>>) + Send + 'static,
    {
        let client = self.clone();

        thread::spawn(move || {
            let result = client.get_languages();
            on_done(result);
        });
    }

    pub fn translate_task(&self, text: &str, source: &str, target: &str) -> Task<Result<String>> {
        let client = self.clone();
        let (text, source, target) = (text.to_string(), source.to_string(), target.to_string());

        task::spawn(move || client.translate(&text, &source, &target))
    }

    pub fn languages_task(&self) -> Task<Result<Vec<Language>>> {
        let client = self.clone();
        task::spawn(move || client.get_languages())
    }
}

fn send_json(req: RequestBuilder) -> Result<Value> {
    let resp = req.send()?;
    let status = resp.status();

    // Read as text first so an error body is not lost when it is not JSON.
    let text = resp.text()?;

    if !status.is_success() {
        return Err(CoreError::Network(extract_error_message(status, &text)));
    }

    serde_json::from_str(&text)
        .map_err(|e| CoreError::Network(format!("invalid JSON from server: {e}")))
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    // { "error": "..." }, { "error": { "message": "..." } } or { "message": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        let msg = v
            .get("error")
            .and_then(|e| e.as_str().or_else(|| e.get("message").and_then(|m| m.as_str())))
            .or_else(|| v.get("message").and_then(|m| m.as_str()));

        if let Some(msg) = msg {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet = match trimmed.char_indices().nth(ERROR_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}
