//! `.properties` text format.
//!
//! Supported syntax:
//! - `key=value`, `key:value` and `key value` (the first unescaped `=`, `:`
//!   or whitespace ends the key)
//! - `#` and `!` comment lines
//! - a line ending in an odd number of `\` continues on the next line, whose
//!   leading whitespace is dropped
//! - escapes `\t \n \r \f \uXXXX`; any other escaped character is itself
//!
//! A later duplicate key replaces the earlier value but keeps its position.

use indexmap::IndexMap;
use rescope_api::{ContentHandle, LoadError, ResourceLoader};
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

const BLANKS: [char; 3] = [' ', '\t', '\x0c'];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertiesError {
    #[error("malformed \\uXXXX escape on line {line}")]
    MalformedUnicode { line: usize },
    #[error("byte 0x{byte:02X} at offset {offset} is not US-ASCII")]
    NotAscii { offset: usize, byte: u8 },
    #[error("UTF-16 content has an odd number of bytes")]
    OddLength,
    #[error("unpaired UTF-16 surrogate 0x{0:04X}")]
    UnpairedSurrogate(u16),
}

/// Ordered string-to-string table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties {
    entries: IndexMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, PropertiesError> {
        let mut props = Properties::new();
        let mut lines = text.lines().enumerate();

        while let Some((index, raw)) = lines.next() {
            let line_no = index + 1;
            let line = raw.trim_start_matches(BLANKS);
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let mut logical = line.to_string();
            while continues(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start_matches(BLANKS)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            props.insert(unescape(key, line_no)?, unescape(value, line_no)?);
        }

        Ok(props)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromStr for Properties {
    type Err = PropertiesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Odd number of trailing backslashes
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let mut rest = line[key_end..].trim_start_matches(BLANKS);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(BLANKS);
    }
    (&line[..key_end], rest)
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let unit = hex_unit(&mut chars, line)?;
                let decoded = if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate: the low half must follow as another \u escape
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(PropertiesError::MalformedUnicode { line });
                    }
                    let low = hex_unit(&mut chars, line)?;
                    char::decode_utf16([unit, low]).next()
                } else {
                    char::decode_utf16([unit]).next()
                };
                match decoded {
                    Some(Ok(ch)) => out.push(ch),
                    _ => return Err(PropertiesError::MalformedUnicode { line }),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn hex_unit(chars: &mut std::str::Chars<'_>, line: usize) -> Result<u16, PropertiesError> {
    let mut unit: u16 = 0;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or(PropertiesError::MalformedUnicode { line })?;
        unit = (unit << 4) | digit as u16;
    }
    Ok(unit)
}

/// Character encoding of `.properties` content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    /// ISO-8859-1; every byte maps to the code point of the same value
    Latin1,
    /// Seven-bit US-ASCII; any byte above 0x7F is rejected
    Ascii,
    Utf16Be,
    Utf16Le,
    /// UTF-16 with an optional byte-order mark, big-endian without one
    Utf16,
}

impl Encoding {
    pub fn decode(self, bytes: Vec<u8>) -> Result<String, LoadError> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes).map_err(LoadError::decode),
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(LoadError::decode(PropertiesError::NotAscii {
                    offset,
                    byte: bytes[offset],
                })),
                None => String::from_utf8(bytes).map_err(LoadError::decode),
            },
            Encoding::Utf16Be => decode_utf16(&bytes, u16::from_be_bytes),
            Encoding::Utf16Le => decode_utf16(&bytes, u16::from_le_bytes),
            Encoding::Utf16 => match bytes.as_slice() {
                [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
                [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
                _ => decode_utf16(&bytes, u16::from_be_bytes),
            },
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, LoadError> {
    if bytes.len() % 2 != 0 {
        return Err(LoadError::decode(PropertiesError::OddLength));
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.map_err(|e| PropertiesError::UnpairedSurrogate(e.unpaired_surrogate())))
        .collect::<Result<String, _>>()
        .map_err(LoadError::decode)
}

/// Decodes `.properties` content into [`Properties`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesLoader {
    encoding: Encoding,
}

impl PropertiesLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(encoding: Encoding) -> Self {
        Self { encoding }
    }

    pub fn latin1() -> Self {
        Self::with_encoding(Encoding::Latin1)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl ResourceLoader<Properties> for PropertiesLoader {
    fn load(&self, content: &dyn ContentHandle) -> Result<Properties, LoadError> {
        let text = self.encoding.decode(content.read_all()?)?;
        Properties::parse(&text).map_err(LoadError::decode)
    }
}
