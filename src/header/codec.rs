//! First-line header wire codec.
//!
//! A stored document is `<header-line>\n<body>`, where the header line is
//! an HTML-comment wrapper around a JSON object with the single top-level
//! key `"vellum"`. Anything that does not match is plain body.

use log::debug;
use serde_json::{Map, Value};

use super::models::{DocumentHeader, HeaderFields, HEADER_KEY};

const OPEN_MARK: &str = "<!--";
const CLOSE_MARK: &str = "-->";

/// Split raw document text into header and body.
///
/// Never fails: a missing, malformed, or foreign first line yields an
/// empty header and the *entire* input as body, so documents created
/// outside the editor still open as plain content.
pub fn load(raw: &str) -> (DocumentHeader, String) {
    let (first_line, rest) = match raw.split_once('\n') {
        Some((line, rest)) => (line, Some(rest)),
        None => (raw, None),
    };

    match parse_header_line(first_line) {
        Some(fields) => {
            let header = migrate(DocumentHeader::from_fields(fields));
            (header, rest.unwrap_or("").to_string())
        }
        None => (DocumentHeader::empty(), raw.to_string()),
    }
}

fn parse_header_line(line: &str) -> Option<HeaderFields> {
    let inner = line
        .trim()
        .strip_prefix(OPEN_MARK)?
        .strip_suffix(CLOSE_MARK)?
        .trim();
    let value: Value = serde_json::from_str(inner).ok()?;
    let payload = value.as_object()?.get(HEADER_KEY)?;
    if !payload.is_object() {
        return None;
    }
    match serde_json::from_value(payload.clone()) {
        Ok(fields) => Some(fields),
        Err(err) => {
            debug!("header line rejected: {err}");
            None
        }
    }
}

/// Render the header line, or `None` for an empty header.
pub fn header_line(header: &DocumentHeader) -> Option<String> {
    let fields = header.fields()?;
    let mut envelope = Map::new();
    envelope.insert(HEADER_KEY.to_string(), serde_json::to_value(fields).ok()?);
    // Value's Display is compact single-line JSON; the header must stay
    // on the first line
    Some(format!("{OPEN_MARK} {} {CLOSE_MARK}", Value::Object(envelope)))
}

/// Join a header and body back into stored text.
///
/// An empty header packs to the body alone; a valid header with an empty
/// body packs to the header line alone.
pub fn pack(header: &DocumentHeader, body: &str) -> String {
    match header_line(header) {
        None => body.to_string(),
        Some(line) if body.is_empty() => line,
        Some(line) => format!("{line}\n{body}"),
    }
}

pub fn pack_bytes(header: &DocumentHeader, body: &str) -> Vec<u8> {
    pack(header, body).into_bytes()
}

/// Schema migration hook, invoked on every parse.
///
/// Headers carry no schema version field yet; absence means version 0,
/// which is current, so this is the identity. It exists so a future
/// schema bump has a single seam and call sites stay untouched.
pub fn migrate(header: DocumentHeader) -> DocumentHeader {
    header
}
