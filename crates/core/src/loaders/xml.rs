//! XML properties documents.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">
//! <properties>
//!   <comment>optional</comment>
//!   <entry key="greeting">hello</entry>
//! </properties>
//! ```
//!
//! Entry text is kept verbatim, surrounding whitespace included. The DTD is
//! never fetched.

use super::Properties;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use rescope_api::{ContentHandle, LoadError, ResourceLoader};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlPropertiesError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error("CDATA section is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("document root is not <properties>")]
    NotProperties,
    #[error("<entry> without a key attribute")]
    MissingKey,
    #[error("unexpected element <{0}>")]
    UnexpectedElement(String),
    #[error("document ends inside <{0}>")]
    Unclosed(&'static str),
}

type ParseResult<T> = Result<T, XmlPropertiesError>;

impl Properties {
    /// Parse an XML properties document
    pub fn parse_xml(text: &str) -> ParseResult<Self> {
        let mut reader = Reader::from_str(text.strip_prefix('\u{feff}').unwrap_or(text));
        let mut props = Properties::new();
        let mut in_root = false;
        let mut seen_root = false;
        let mut in_comment = false;
        let mut entry: Option<(String, String)> = None;

        loop {
            let event = reader.read_event()?;
            let empty = matches!(event, Event::Empty(_));
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let name = e.name();
                    match name.as_ref() {
                        b"properties" if !seen_root => {
                            seen_root = true;
                            in_root = !empty;
                        }
                        _ if !seen_root => return Err(XmlPropertiesError::NotProperties),
                        b"comment" if in_root && entry.is_none() && !in_comment => {
                            in_comment = !empty;
                        }
                        b"entry" if in_root && entry.is_none() && !in_comment => {
                            let key = entry_key(e)?;
                            if empty {
                                props.insert(key, "");
                            } else {
                                entry = Some((key, String::new()));
                            }
                        }
                        other => {
                            return Err(XmlPropertiesError::UnexpectedElement(
                                String::from_utf8_lossy(other).into_owned(),
                            ));
                        }
                    }
                }
                Event::Text(t) => {
                    if let Some((_, value)) = entry.as_mut() {
                        value.push_str(&t.unescape().map_err(quick_xml::Error::from)?);
                    }
                }
                Event::CData(c) => {
                    if let Some((_, value)) = entry.as_mut() {
                        value.push_str(std::str::from_utf8(&c)?);
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"entry" => {
                        if let Some((key, value)) = entry.take() {
                            props.insert(key, value);
                        }
                    }
                    b"comment" => in_comment = false,
                    b"properties" => in_root = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(XmlPropertiesError::NotProperties);
        }
        if entry.is_some() {
            return Err(XmlPropertiesError::Unclosed("entry"));
        }
        if in_comment {
            return Err(XmlPropertiesError::Unclosed("comment"));
        }
        if in_root {
            return Err(XmlPropertiesError::Unclosed("properties"));
        }
        Ok(props)
    }
}

fn entry_key(e: &BytesStart<'_>) -> ParseResult<String> {
    let attr = e
        .try_get_attribute("key")
        .map_err(quick_xml::Error::from)?
        .ok_or(XmlPropertiesError::MissingKey)?;
    let key = attr.unescape_value().map_err(quick_xml::Error::from)?;
    Ok(key.into_owned())
}

/// Decodes UTF-8 XML properties documents into [`Properties`]
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlPropertiesLoader;

impl ResourceLoader<Properties> for XmlPropertiesLoader {
    fn load(&self, content: &dyn ContentHandle) -> Result<Properties, LoadError> {
        let text = String::from_utf8(content.read_all()?).map_err(LoadError::decode)?;
        Properties::parse_xml(&text).map_err(LoadError::decode)
    }
}
