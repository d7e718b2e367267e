//! Minimal XML helpers for SOAP envelopes.

use std::borrow::Cow;

use quick_xml::{Reader, events::Event};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Raised when a document is not well-formed XML.
#[derive(Debug, Error)]
#[error("invalid XML: {0}")]
pub struct XmlError(String);

/// Fault returned in place of a SOAP response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SoapFault {
    pub code: String,
    pub message: String,
}

/// Escape `value` for use as element text.
pub(crate) fn escape(value: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(value)
}

/// Text of the first element matching each of `names` (by local name,
/// ignoring ASCII case). Empty elements map to an empty string.
pub(crate) fn element_texts<'n>(
    xml: &str,
    names: &[&'n str],
) -> Result<FxHashMap<&'n str, String>, XmlError> {
    let mut reader = Reader::from_str(xml);

    reader.config_mut().trim_text(true);

    let mut found: FxHashMap<&'n str, String> = FxHashMap::default();
    let mut current: Option<&'n str> = None;

    let matching = |local_name: &[u8], found: &FxHashMap<&'n str, String>| {
        names
            .iter()
            .copied()
            .find(|name| local_name.eq_ignore_ascii_case(name.as_bytes()))
            .filter(|name| !found.contains_key(name))
    };

    loop {
        match reader
            .read_event()
            .map_err(|error| XmlError(error.to_string()))?
        {
            Event::Start(start) => {
                current = matching(start.local_name().as_ref(), &found);

                if let Some(name) = current {
                    found.insert(name, String::new());
                }
            }
            Event::Empty(empty) => {
                if let Some(name) = matching(empty.local_name().as_ref(), &found) {
                    found.insert(name, String::new());
                }
            }
            Event::Text(text) => {
                if let Some(text_buf) = current.and_then(|name| found.get_mut(name)) {
                    text_buf.push_str(&text.unescape().map_err(|error| XmlError(error.to_string()))?);
                }
            }
            Event::CData(data) => {
                if let Some(text_buf) = current.and_then(|name| found.get_mut(name)) {
                    text_buf.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(found)
}

/// Extract a SOAP 1.1 fault from `body`, if it carries one.
pub(crate) fn soap_fault(body: &str) -> Result<Option<SoapFault>, XmlError> {
    let mut texts = element_texts(body, &["Fault", "faultcode", "faultstring"])?;

    if !texts.contains_key("Fault") {
        return Ok(None);
    }

    Ok(Some(SoapFault {
        code: texts.remove("faultcode").unwrap_or_default(),
        message: texts.remove("faultstring").unwrap_or_default(),
    }))
}
