use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::error::{CoreError, Result};

/// Text of a translation file plus the encoding it was decoded from.
#[derive(Debug)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Reads a file and decodes it to UTF-8. Decoding is lossy, never fatal.
pub fn read_text(path: &Path) -> Result<DecodedText> {
    let bytes = fs::read(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let decoded = decode(&bytes);
    if decoded.encoding != UTF_8.name() {
        debug!("decoded {} as {}", path.display(), decoded.encoding);
    }
    Ok(decoded)
}

pub fn decode(bytes: &[u8]) -> DecodedText {
    // BOM UTF-8 (EF BB BF)
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return DecodedText {
            text: String::from_utf8_lossy(rest).into_owned(),
            encoding: UTF_8.name(),
        };
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: s.to_string(),
            encoding: UTF_8.name(),
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding: &'static Encoding = detector.guess(None, true);

    let (text, _, _had_errors) = encoding.decode(bytes);
    DecodedText {
        text: text.into_owned(),
        encoding: encoding.name(),
    }
}
