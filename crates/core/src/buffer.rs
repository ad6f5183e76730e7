use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to decode buffer contents")]
    InvalidEncoding,
}

/// Decoded text that patterns are searched in.
#[derive(Debug, Clone)]
pub struct Buffer {
    text: String,
    encoding: &'static Encoding,
    path: Option<PathBuf>,
}

impl Buffer {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            encoding: UTF_8,
            path: None,
        }
    }

    /// Reads and decodes a file: BOM first, then strict UTF-8, then a legacy
    /// encoding guessed from the content.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BufferError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| BufferError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let (text, encoding) = decode(&bytes)?;
        log::debug!("opened {} as {}", path.display(), encoding.name());
        Ok(Self {
            text,
            encoding,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn decode(bytes: &[u8]) -> Result<(String, &'static Encoding), BufferError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_strict(&bytes[bom_len..], encoding).map(|text| (text, encoding));
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok((text.to_owned(), UTF_8));
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, true);
    if guess == UTF_8 || guess == UTF_16LE || guess == UTF_16BE {
        return Err(BufferError::InvalidEncoding);
    }
    decode_strict(bytes, guess).map(|text| (text, guess))
}

fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Result<String, BufferError> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(BufferError::InvalidEncoding);
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::SHIFT_JIS;
    use tempfile::tempdir;

    fn open_bytes(bytes: &[u8]) -> Result<Buffer, BufferError> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("buffer.txt");
        fs::write(&path, bytes).unwrap();
        Buffer::open(&path)
    }

    #[test]
    fn opens_plain_and_bom_utf8() {
        let buffer = open_bytes(b"hello").unwrap();
        assert_eq!(buffer.text(), "hello");
        assert_eq!(buffer.encoding_name(), "UTF-8");

        let buffer = open_bytes(b"\xEF\xBB\xBFhello").unwrap();
        assert_eq!(buffer.text(), "hello");
    }

    #[test]
    fn opens_utf16_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let buffer = open_bytes(&bytes).unwrap();
        assert_eq!(buffer.text(), "hi");
        assert_eq!(buffer.encoding_name(), "UTF-16LE");
    }

    #[test]
    fn detects_legacy_encoding() {
        let (encoded, _, _) = SHIFT_JIS.encode("こんにちは、世界。テスト文字列です。");
        let buffer = open_bytes(&encoded).unwrap();
        assert_eq!(buffer.text(), "こんにちは、世界。テスト文字列です。");
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let err = Buffer::open(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, BufferError::Read { .. }));
    }
}
