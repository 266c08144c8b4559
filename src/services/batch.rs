use std::iter::Enumerate;
use std::thread;
use std::vec;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::entry::FileEntry;
use crate::services::client::TranslationClient;

/// Outcome for one file entry; `index` is its position in the input list.
#[derive(Debug)]
pub struct BatchItem {
    pub index: usize,
    pub msgid: String,
    pub result: Result<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    fn record(&mut self, item: &BatchItem) {
        if item.result.is_ok() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Translates entries one at a time; each `next()` is one blocking request.
/// A failed entry is yielded like any other and does not stop the batch.
pub struct BatchTranslation {
    client: TranslationClient,
    entries: Enumerate<vec::IntoIter<FileEntry>>,
    source: String,
    target: String,
}

impl BatchTranslation {
    pub fn new(client: &TranslationClient, entries: Vec<FileEntry>, source: &str, target: &str) -> Self {
        BatchTranslation {
            client: client.clone(),
            entries: entries.into_iter().enumerate(),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

impl Iterator for BatchTranslation {
    type Item = BatchItem;

    fn next(&mut self) -> Option<BatchItem> {
        let (index, entry) = self.entries.next()?;
        let result = self.client.translate(&entry.msgid, &self.source, &self.target);

        Some(BatchItem {
            index,
            msgid: entry.msgid,
            result,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

/// Runs a whole batch on one worker thread, reporting each entry as it completes.
pub fn translate_all_async<I, D>(
    client: &TranslationClient,
    entries: Vec<FileEntry>,
    source: &str,
    target: &str,
    mut on_item: I,
    on_done: D,
) where
    I: FnMut(BatchItem) + Send + 'static,
    D: FnOnce(BatchReport) + Send + 'static,
{
    let batch = BatchTranslation::new(client, entries, source, target);

    thread::spawn(move || {
        let mut report = BatchReport::default();

        for item in batch {
            report.record(&item);
            on_item(item);
        }

        debug!("batch finished: {} ok, {} failed", report.succeeded, report.failed);
        on_done(report);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::time::Duration;

    fn closed_port_client() -> TranslationClient {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        TranslationClient::new(&format!("http://127.0.0.1:{port}"), "").unwrap()
    }

    fn entries() -> Vec<FileEntry> {
        vec![
            FileEntry::new("One", "", true),
            FileEntry::new("Two", "", true),
        ]
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let client = closed_port_client();
        let items: Vec<BatchItem> = BatchTranslation::new(&client, entries(), "en", "sv").collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].index, 0);
        assert_eq!(items[1].msgid, "Two");
        assert!(items.iter().all(|i| matches!(&i.result, Err(e) if e.kind() == "network")));
    }

    #[test]
    fn async_batch_reports_each_item_then_summary() {
        let client = closed_port_client();
        let (tx, rx) = mpsc::channel();
        let done_tx = tx.clone();

        translate_all_async(
            &client,
            entries(),
            "en",
            "sv",
            move |item| {
                let _ = tx.send(format!("item {}", item.index));
            },
            move |report| {
                let _ = done_tx.send(format!("done {} {}", report.succeeded, report.failed));
            },
        );

        let timeout = Duration::from_secs(10);
        let got: Vec<String> = (0..3).map(|_| rx.recv_timeout(timeout).unwrap()).collect();
        assert_eq!(got, vec!["item 0", "item 1", "done 0 2"]);
    }
}
