use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::model::entry::FileEntry;

#[derive(Debug, Clone, Copy)]
enum Field {
    Source,
    Translation,
}

/// A `<message>` being read. `depth` is the element's own nesting level and
/// `slot` the index reserved for it in the output, so nested messages keep
/// document order.
#[derive(Debug, Default)]
struct Message {
    depth: usize,
    slot: usize,
    source: Option<String>,
    translation: Option<String>,
    translation_type: Option<String>,
    field: Option<(Field, usize)>,
}

impl Message {
    fn new(depth: usize, slot: usize) -> Self {
        Message {
            depth,
            slot,
            ..Default::default()
        }
    }

    /// Starts collecting text for the first `source` / `translation` child.
    fn open_field(&mut self, e: &BytesStart, depth: usize) -> Result<(), String> {
        let field = match e.name().as_ref() {
            b"source" if self.source.is_none() => {
                self.source = Some(String::new());
                Field::Source
            }
            b"translation" if self.translation.is_none() => {
                self.translation = Some(String::new());
                self.translation_type = attribute(e, b"type")?;
                Field::Translation
            }
            _ => return Ok(()),
        };

        self.field = Some((field, depth));
        Ok(())
    }

    /// A child element inside the open field ends its leading text.
    fn child_opened(&mut self, depth: usize) {
        if matches!(self.field, Some((_, d)) if depth > d) {
            self.field = None;
        }
    }

    fn close_field(&mut self, depth: usize) {
        if matches!(self.field, Some((_, d)) if d == depth) {
            self.field = None;
        }
    }

    fn push_text(&mut self, depth: usize, text: &str) {
        let target = match self.field {
            Some((Field::Source, d)) if d == depth => &mut self.source,
            Some((Field::Translation, d)) if d == depth => &mut self.translation,
            _ => return,
        };
        target.get_or_insert_with(String::new).push_str(text);
    }

    fn into_entry(self) -> FileEntry {
        let msgid = self.source.unwrap_or_default();
        let msgstr = self.translation.unwrap_or_default();
        let unfinished = self.translation_type.as_deref() == Some("unfinished");
        let untranslated = unfinished || msgstr.is_empty();

        FileEntry::new(msgid, msgstr, untranslated)
    }
}

fn attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>, String> {
    match e.try_get_attribute(key).map_err(|err| err.to_string())? {
        Some(attr) => {
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

fn junk_after_root(pos: usize) -> String {
    format!("junk after document element at position {pos}")
}

/// Extracts every `<message>` of a Qt Linguist document, nested ones
/// included, in document order.
///
/// Only the leading text of `source` / `translation` is read: it stops at the
/// first child element, so `<numerusform>` children are ignored.
pub fn parse(text: &str) -> Result<Vec<FileEntry>, String> {
    let mut reader = Reader::from_str(text);
    let mut buf = Vec::new();

    let mut entries = Vec::new();
    let mut open: Vec<Message> = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut root_closed = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("error at position {}: {e}", reader.buffer_position()))?;

        match event {
            Event::Start(e) => {
                if root_closed {
                    return Err(junk_after_root(reader.buffer_position()));
                }
                depth += 1;
                seen_root = true;

                if let Some(msg) = open.last_mut() {
                    msg.child_opened(depth);
                }

                if e.name().as_ref() == b"message" {
                    open.push(Message::new(depth, entries.len()));
                    entries.push(FileEntry::new("", "", true));
                } else if let Some(msg) = open.last_mut() {
                    if depth == msg.depth + 1 {
                        msg.open_field(&e, depth)?;
                    }
                }
            }

            Event::Empty(e) => {
                if root_closed {
                    return Err(junk_after_root(reader.buffer_position()));
                }
                seen_root = true;
                let own_depth = depth + 1;

                if let Some(msg) = open.last_mut() {
                    msg.child_opened(own_depth);
                }

                if e.name().as_ref() == b"message" {
                    entries.push(Message::new(own_depth, entries.len()).into_entry());
                } else if let Some(msg) = open.last_mut() {
                    if own_depth == msg.depth + 1 {
                        msg.open_field(&e, own_depth)?;
                        msg.close_field(own_depth);
                    }
                }

                if depth == 0 {
                    root_closed = true;
                }
            }

            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| format!("error at position {}: {err}", reader.buffer_position()))?;
                if root_closed && !text.trim().is_empty() {
                    return Err(junk_after_root(reader.buffer_position()));
                }
                if let Some(msg) = open.last_mut() {
                    msg.push_text(depth, &text);
                }
            }

            Event::CData(e) => {
                if root_closed {
                    return Err(junk_after_root(reader.buffer_position()));
                }
                if let Some(msg) = open.last_mut() {
                    let raw = e.into_inner();
                    msg.push_text(depth, &String::from_utf8_lossy(&raw));
                }
            }

            Event::End(_) => {
                if open.last().is_some_and(|m| m.depth == depth) {
                    if let Some(msg) = open.pop() {
                        if let Some(entry) = entries.get_mut(msg.slot) {
                            *entry = msg.into_entry();
                        }
                    }
                } else if let Some(msg) = open.last_mut() {
                    msg.close_field(depth);
                }

                depth = depth.saturating_sub(1);
                if depth == 0 {
                    root_closed = true;
                }
            }

            Event::Eof => break,

            _ => {}
        }

        buf.clear();
    }

    if !seen_root {
        return Err("no element found".into());
    }
    if depth != 0 {
        return Err("unexpected end of document: unclosed elements".into());
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="sv_SE">
<context>
    <name>MainWindow</name>
    <message>
        <location filename="../src/mainwindow.cpp" line="42"/>
        <source>Hi</source>
        <translation type="unfinished"></translation>
    </message>
    <message>
        <source>Hello</source>
        <translation>Hej</translation>
    </message>
    <message>
        <source>Bye</source>
        <translation type="unfinished">Hej då</translation>
    </message>
    <message>
        <source>Tom &amp; Jerry</source>
        <translation type="unfinished"/>
    </message>
</context>
</TS>
"#;

    #[test]
    fn reads_messages_and_unfinished_flags() {
        let entries = parse(SAMPLE).unwrap();
        assert_eq!(
            entries,
            vec![
                FileEntry::new("Hi", "", true),
                FileEntry::new("Hello", "Hej", false),
                FileEntry::new("Bye", "Hej då", true),
                FileEntry::new("Tom & Jerry", "", true),
            ]
        );
    }

    #[test]
    fn bare_message_elements_parse() {
        let unfinished = parse(
            r#"<message><source>Hi</source><translation type="unfinished"></translation></message>"#,
        )
        .unwrap();
        assert_eq!(unfinished, vec![FileEntry::new("Hi", "", true)]);

        let done =
            parse("<message><source>Hi</source><translation>Hej</translation></message>").unwrap();
        assert_eq!(done, vec![FileEntry::new("Hi", "Hej", false)]);
    }

    #[test]
    fn missing_children_read_as_empty() {
        let entries = parse("<TS><message><source>Only source</source></message><message/></TS>")
            .unwrap();
        assert_eq!(
            entries,
            vec![
                FileEntry::new("Only source", "", true),
                FileEntry::new("", "", true),
            ]
        );
    }

    #[test]
    fn cdata_text_is_kept() {
        let entries =
            parse("<TS><message><source><![CDATA[<b>bold</b>]]></source><translation>fet</translation></message></TS>")
                .unwrap();
        assert_eq!(entries[0].msgid, "<b>bold</b>");
    }

    #[test]
    fn malformed_documents_are_errors() {
        assert!(parse("<TS><message><source>Hi</translation></message></TS>").is_err());
        assert!(parse("<TS><message><source>Hi</source>").is_err());
        assert!(parse("").is_err());
        assert!(parse("<TS><message><source>A</source></message></TS>junk").is_err());
        assert!(parse(
            "<message><source>A</source></message><message><source>B</source></message>"
        )
        .is_err());
    }

    #[test]
    fn trailing_whitespace_after_root_is_fine() {
        let entries = parse("<TS><message><source>A</source></message></TS>\n  \n").unwrap();
        assert_eq!(entries, vec![FileEntry::new("A", "", true)]);
    }

    #[test]
    fn field_text_stops_at_first_child_element() {
        let entries = parse(
            "<TS><message><source>a<b>x</b>c</source><translation>d<i>y</i>e</translation></message></TS>",
        )
        .unwrap();
        assert_eq!(entries, vec![FileEntry::new("a", "d", false)]);
    }

    #[test]
    fn nested_messages_are_all_read_in_document_order() {
        let entries = parse(
            "<message><source>A</source><message><source>B</source><translation>Bee</translation></message></message>",
        )
        .unwrap();
        assert_eq!(
            entries,
            vec![
                FileEntry::new("A", "", true),
                FileEntry::new("B", "Bee", false),
            ]
        );
    }
}
