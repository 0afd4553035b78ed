//! Canonical JSON encoding for deterministic serialization.
//!
//! This module implements the byte-exact object encoding used for signing,
//! hashing, and persistence:
//! - Object keys sorted by ASCII byte comparison
//! - Keys present only when their value is present (never `null`)
//! - Byte values as standard base64 with padding
//! - Integers as decimal digits without leading zeros
//! - No insignificant whitespace
//!
//! The canonical encoding is critical: the signature, the `prev` hash link,
//! and the persisted form are all defined against these exact bytes, so the
//! same statement must encode identically across all implementations.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Builder for one canonical JSON object.
///
/// Fields may be added in any order; [`finish`](Self::finish) emits them
/// sorted by key bytes. Values are encoded eagerly, so the writer holds only
/// `(key, encoded value)` pairs.
pub struct ObjectWriter {
    entries: Vec<(&'static str, Vec<u8>)>,
}

impl ObjectWriter {
    /// Start an empty object.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add a string field.
    pub fn string(&mut self, key: &'static str, value: &str) {
        let mut buf = Vec::with_capacity(value.len() + 2);
        write_json_string(&mut buf, value);
        self.entries.push((key, buf));
    }

    /// Add a byte field, encoded as standard base64 with padding.
    pub fn bytes(&mut self, key: &'static str, value: &[u8]) {
        let mut buf = Vec::new();
        write_json_string(&mut buf, &BASE64.encode(value));
        self.entries.push((key, buf));
    }

    /// Add an unsigned integer field.
    pub fn uint(&mut self, key: &'static str, value: u64) {
        self.entries.push((key, value.to_string().into_bytes()));
    }

    /// Add a signed integer field.
    pub fn int(&mut self, key: &'static str, value: i64) {
        self.entries.push((key, value.to_string().into_bytes()));
    }

    /// Emit the canonical compact form: sorted keys, no whitespace.
    pub fn finish(self) -> Vec<u8> {
        let entries = self.sorted();
        let mut buf = Vec::with_capacity(64);
        buf.push(b'{');
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            write_json_string(&mut buf, key);
            buf.push(b':');
            buf.extend_from_slice(value);
        }
        buf.push(b'}');
        buf
    }

    /// Emit the human-readable form: sorted keys, two-space indent.
    ///
    /// Used by [`Sigchain::spew`](crate::Sigchain::spew); golden-tested, so
    /// the layout here is part of the external interface.
    pub fn finish_pretty(self) -> String {
        let entries = self.sorted();
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(b"{\n");
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                buf.extend_from_slice(b",\n");
            }
            buf.extend_from_slice(b"  ");
            write_json_string(&mut buf, key);
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value);
        }
        buf.extend_from_slice(b"\n}");
        // The writer only ever receives UTF-8 fragments.
        String::from_utf8(buf).unwrap_or_default()
    }

    fn sorted(self) -> Vec<(&'static str, Vec<u8>)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        entries
    }
}

impl Default for ObjectWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a JSON string literal with the minimal required escapes.
fn write_json_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for c in s.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            c if (c as u32) < 0x20 => {
                let esc = format!("\\u{:04x}", c as u32);
                buf.extend_from_slice(esc.as_bytes());
            }
            c => {
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

/// Parse bytes as a JSON object map.
pub(crate) fn parse_object(b: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(b) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::Encoding("expected object".into())),
        Err(e) => Err(Error::Encoding(e.to_string())),
    }
}

/// Extract an optional string field.
pub(crate) fn str_field(map: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::Encoding(format!("field {} is not a string", key))),
    }
}

/// Extract an optional base64 byte field.
pub(crate) fn bytes_field(map: &Map<String, Value>, key: &str) -> Result<Option<Vec<u8>>> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => BASE64
            .decode(s)
            .map(Some)
            .map_err(|e| Error::Encoding(format!("field {}: {}", key, e))),
        Some(_) => Err(Error::Encoding(format!("field {} is not a string", key))),
    }
}

/// Extract an optional unsigned integer field.
pub(crate) fn uint_field(map: &Map<String, Value>, key: &str) -> Result<Option<u64>> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| Error::Encoding(format!("field {} is not an unsigned integer", key))),
        Some(_) => Err(Error::Encoding(format!("field {} is not a number", key))),
    }
}

/// Extract an optional signed integer field.
pub(crate) fn int_field(map: &Map<String, Value>, key: &str) -> Result<Option<i64>> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| Error::Encoding(format!("field {} is not an integer", key))),
        Some(_) => Err(Error::Encoding(format!("field {} is not a number", key))),
    }
}
