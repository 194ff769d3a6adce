/*!
 * Text Encodings
 * Resolvable encodings for sink writes
 */

use crate::core::errors::StreamError;
use serde::{Deserialize, Serialize};

/// Substitute byte for characters unmappable in ascii/latin1
const SUBSTITUTE: u8 = b'?';

/// Supported text encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    Utf8,
    Ascii,
    Latin1,
    Utf16Le,
}

impl Encoding {
    /// Resolve an optional caller-supplied name; absence means the default.
    /// Unknown names are a hard error, never a silent fallback.
    pub fn resolve(name: Option<&str>, default: Encoding) -> Result<Self, StreamError> {
        match name {
            None => Ok(default),
            Some(name) => Self::from_name(name),
        }
    }

    /// Parse from a case-insensitive encoding name
    pub fn from_name(name: &str) -> Result<Self, StreamError> {
        match name.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Self::Latin1),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Self::Utf16Le),
            _ => Err(StreamError::UnknownEncoding(name.to_string())),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin1",
            Self::Utf16Le => "utf16le",
        }
    }

    /// Encode text into bytes. Unmappable characters in the single-byte
    /// encodings become `?` (deterministic, never an error).
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { SUBSTITUTE })
                .collect(),
            Self::Latin1 => text
                .chars()
                .map(|c| {
                    let cp = c as u32;
                    if cp <= 0xFF {
                        cp as u8
                    } else {
                        SUBSTITUTE
                    }
                })
                .collect(),
            Self::Utf16Le => text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect(),
        }
    }
}
