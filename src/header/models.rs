//! Header data models

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{HeaderError, HeaderResult};

/// Top-level JSON key identifying a vellum header line.
pub const HEADER_KEY: &str = "vellum";

/// Maximum length of a password hint in characters.
pub const MAX_HINT_LEN: usize = 32;

/// Encryption parameters stored with an encrypted document.
///
/// `salt` and `iterations` are fixed at encryption time; re-encrypting a
/// document from scratch is the only way they change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionParams {
    /// Salt for key derivation; URL-safe text, fed to the KDF as UTF-8
    pub salt: String,
    /// KDF work factor captured when the document was encrypted
    #[serde(deserialize_with = "de_iterations")]
    pub iterations: u32,
    /// Password reminder shown at unlock, possibly empty
    #[serde(default)]
    pub hint: String,
}

impl EncryptionParams {
    /// Create parameters for a freshly encrypted document. Hints longer
    /// than [`MAX_HINT_LEN`] characters are truncated.
    pub fn new(salt: impl Into<String>, iterations: u32, hint: &str) -> Self {
        Self {
            salt: salt.into(),
            iterations,
            hint: hint.chars().take(MAX_HINT_LEN).collect(),
        }
    }
}

/// Accept the stored iteration count as either an integer or a decimal
/// string; older files carry it as a string.
fn de_iterations<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| de::Error::custom("iteration count out of range")),
        Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| de::Error::custom("iteration count is not a number")),
        other => Err(de::Error::custom(format!(
            "unexpected iteration count value: {other}"
        ))),
    }
}

/// An `encryption` entry that is not a JSON object does not mark the
/// document encrypted; the rest of the header stays usable.
fn de_encryption<'de, D>(deserializer: D) -> Result<Option<EncryptionParams>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    serde_json::from_value(value).map(Some).map_err(de::Error::custom)
}

/// The fields of a parsed header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderFields {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "stamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "stamp")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_encryption"
    )]
    pub encryption: Option<EncryptionParams>,
    /// Open bag of custom fields (e.g. `title`), kept for forward
    /// compatibility
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Timestamps serialize as RFC 3339; parsing also accepts the legacy
/// space-separated shape written by early versions.
mod stamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(stamp) => {
                serializer.serialize_str(&stamp.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => super::parse_stamp(&raw).map(Some).map_err(D::Error::custom),
        }
    }
}

pub(crate) fn parse_stamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(stamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        .map_err(|err| format!("unrecognized timestamp {raw:?}: {err}"))
}

/// Header stamps are stored at second precision; sub-second parts would
/// not survive the wire format.
fn now_second() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(0).unwrap_or(now)
}

/// The metadata envelope stored as the first line of a document.
///
/// A header is either *valid* (parsed from a header line, or freshly
/// constructed) or *empty*: documents created outside the editor have no
/// header at all, and every mutation of an empty header fails with
/// [`HeaderError::Empty`] rather than silently creating one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentHeader {
    fields: Option<HeaderFields>,
}

impl DocumentHeader {
    /// The empty (invalid) header of a headerless document.
    pub fn empty() -> Self {
        Self { fields: None }
    }

    /// A valid header with no fields set yet.
    pub fn new() -> Self {
        Self {
            fields: Some(HeaderFields::default()),
        }
    }

    pub(crate) fn from_fields(fields: HeaderFields) -> Self {
        Self { fields: Some(fields) }
    }

    pub(crate) fn fields(&self) -> Option<&HeaderFields> {
        self.fields.as_ref()
    }

    fn fields_mut(&mut self) -> HeaderResult<&mut HeaderFields> {
        self.fields.as_mut().ok_or(HeaderError::Empty)
    }

    pub fn is_valid(&self) -> bool {
        self.fields.is_some()
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(&self.fields, Some(f) if f.encryption.is_some())
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.fields.as_ref().and_then(|f| f.created)
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.fields.as_ref().and_then(|f| f.updated)
    }

    pub fn encryption(&self) -> Option<&EncryptionParams> {
        self.fields.as_ref().and_then(|f| f.encryption.as_ref())
    }

    pub fn title(&self) -> Option<&str> {
        self.get_extra("title").and_then(Value::as_str)
    }

    pub fn set_title(&mut self, title: &str) -> HeaderResult<()> {
        self.set_extra("title", Value::String(title.to_string()))
    }

    /// Catch-all getter for custom top-level fields.
    pub fn get_extra(&self, key: &str) -> Option<&Value> {
        self.fields.as_ref().and_then(|f| f.extra.get(key))
    }

    /// Catch-all setter for custom top-level fields.
    pub fn set_extra(&mut self, key: &str, value: Value) -> HeaderResult<()> {
        self.fields_mut()?.extra.insert(key.to_string(), value);
        Ok(())
    }

    pub fn set_encryption(&mut self, params: EncryptionParams) -> HeaderResult<()> {
        self.fields_mut()?.encryption = Some(params);
        Ok(())
    }

    /// Remove the encryption block, leaving the rest of the header intact.
    pub fn clear_encryption(&mut self) -> HeaderResult<()> {
        self.fields_mut()?.encryption = None;
        Ok(())
    }

    /// Set `updated` to now; `created` is set only if still absent and
    /// never touched afterwards.
    pub fn refresh(&mut self) -> HeaderResult<()> {
        let fields = self.fields_mut()?;
        let now = now_second();
        if fields.created.is_none() {
            fields.created = Some(now);
        }
        fields.updated = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_header_is_invalid() {
        let header = DocumentHeader::empty();
        assert!(!header.is_valid());
        assert!(!header.is_encrypted());
        assert_eq!(header.created(), None);
    }

    #[test]
    fn test_mutating_empty_header_fails() {
        let mut header = DocumentHeader::empty();
        assert!(matches!(header.refresh(), Err(HeaderError::Empty)));
        assert!(matches!(header.set_title("x"), Err(HeaderError::Empty)));
        assert!(matches!(
            header.set_encryption(EncryptionParams::new("salt", 1000, "")),
            Err(HeaderError::Empty)
        ));
        // still empty afterwards
        assert!(!header.is_valid());
    }

    #[test]
    fn test_refresh_sets_created_once() {
        let mut header = DocumentHeader::new();
        header.refresh().unwrap();
        let created = header.created().unwrap();
        let updated = header.updated().unwrap();
        assert!(updated >= created);

        std::thread::sleep(std::time::Duration::from_millis(5));
        header.refresh().unwrap();
        assert_eq!(header.created().unwrap(), created);
        assert!(header.updated().unwrap() >= updated);
    }

    #[test]
    fn test_hint_is_truncated() {
        let long = "x".repeat(100);
        let params = EncryptionParams::new("salt", 1000, &long);
        assert_eq!(params.hint.chars().count(), MAX_HINT_LEN);
    }

    #[test]
    fn test_iterations_accept_string_or_integer() {
        let from_int: EncryptionParams =
            serde_json::from_str(r#"{"salt":"s","iterations":1000,"hint":""}"#).unwrap();
        let from_str: EncryptionParams =
            serde_json::from_str(r#"{"salt":"s","iterations":"1000","hint":""}"#).unwrap();
        assert_eq!(from_int.iterations, 1000);
        assert_eq!(from_str.iterations, 1000);

        assert!(serde_json::from_str::<EncryptionParams>(
            r#"{"salt":"s","iterations":"lots","hint":""}"#
        )
        .is_err());
    }

    #[test]
    fn test_title_round_trips_through_extra() {
        let mut header = DocumentHeader::new();
        header.set_title("My Notes").unwrap();
        assert_eq!(header.title(), Some("My Notes"));
        assert!(header.get_extra("title").is_some());
        assert_eq!(header.get_extra("missing"), None);
    }

    #[test]
    fn test_legacy_timestamp_shape() {
        let stamp = parse_stamp("2024-03-01 08:30:00").unwrap();
        assert_eq!(stamp.to_rfc3339(), "2024-03-01T08:30:00+00:00");
        assert!(parse_stamp("yesterday").is_err());
    }
}
