//! Data shapes exchanged with the inpainting service
//!
//! Nothing here is persisted. Records are read from the info endpoint and
//! dropped at the end of the workflow; the session credential is supplied by
//! the caller (or handed back by the upload endpoint) and threaded by value.

use crate::error::{InpaintError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the session cookie the service issues
pub const SESSION_COOKIE_NAME: &str = "connect.sid";

/// Opaque `connect.sid` cookie value identifying the caller
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    /// Accept either a bare cookie value or a `connect.sid=<value>` pair
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let value = trimmed
            .strip_prefix(SESSION_COOKIE_NAME)
            .and_then(|rest| rest.strip_prefix('='))
            .unwrap_or(trimmed);

        if value.is_empty() {
            return Err(InpaintError::invalid_config(
                "Session credential cannot be empty",
            ));
        }
        if value.contains(';') || value.chars().any(char::is_whitespace) {
            return Err(InpaintError::invalid_config(
                "Session credential must be a single cookie value",
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// Extract `connect.sid` from a `Set-Cookie` header value
    #[must_use]
    pub fn from_set_cookie(header: &str) -> Option<Self> {
        let pair = header.split(';').next()?.trim();
        let (name, value) = pair.split_once('=')?;
        if name.trim() != SESSION_COOKIE_NAME || value.is_empty() {
            return None;
        }
        Some(Self(value.to_string()))
    }

    /// Raw cookie value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Value for the `Cookie` request header
    #[must_use]
    pub fn cookie_header(&self) -> String {
        format!("{}={}", SESSION_COOKIE_NAME, self.0)
    }
}

impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionCredential").field(&"<redacted>").finish()
    }
}

/// One entry of the `images` list returned by the info endpoint
///
/// Fields are kept as raw JSON so an oddly typed entry elsewhere in the list
/// never stops the lookup. Types are checked only on the matched record, by
/// [`EditorTarget::from_record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Opaque identifier; the service may send it as a string or a number
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub id: Value,

    /// Capability token granting edit access to the image
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub secret: Value,

    /// Name the image was uploaded under, without extension
    #[serde(rename = "fileName", default, skip_serializing_if = "Value::is_null")]
    pub file_name: Value,

    /// Remaining fields, kept verbatim for reporting
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageRecord {
    /// Record carrying only a file name
    #[must_use]
    pub fn named<S: Into<String>>(file_name: S) -> Self {
        Self {
            id: Value::Null,
            secret: Value::Null,
            file_name: Value::String(file_name.into()),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_credentials<I: Into<String>, S: Into<String>>(mut self, id: I, secret: S) -> Self {
        self.id = Value::String(id.into());
        self.secret = Value::String(secret.into());
        self
    }

    /// The upload name, when the service sent it as a string
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_str()
    }

    /// Whether this record was uploaded under `file_name`
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.file_name() == Some(file_name)
    }
}

/// Read an `id` or `secret` as text; numbers are accepted as their decimal form
fn opaque_token(value: &Value, field: &str, record_name: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Err(InpaintError::invalid_response(format!(
            "Record '{}' has no '{}'",
            record_name, field
        ))),
        other => Err(InpaintError::invalid_response(format!(
            "Record '{}' has a '{}' that is neither a string nor a number: {}",
            record_name, field, other
        ))),
    }
}

/// First record, in server order, uploaded under `file_name`
///
/// The comparison is exact. The service stores names without their
/// extension, so callers pass the base name they uploaded with.
#[must_use]
pub fn find_by_file_name<'a>(records: &'a [ImageRecord], file_name: &str) -> Option<&'a ImageRecord> {
    records.iter().find(|record| record.matches(file_name))
}

/// Decode the info endpoint body into its `images` list
///
/// # Errors
/// - Body is not JSON
/// - Body has no `images` member, or it is not a list
/// - A list entry is not a record object
pub fn parse_image_list(body: &[u8]) -> Result<Vec<ImageRecord>> {
    const ENDPOINT: &str = "/user/info/";

    let document: Value = serde_json::from_slice(body).map_err(|e| {
        InpaintError::response_shape_error(ENDPOINT, &format!("body is not valid JSON: {}", e))
    })?;

    let images = document
        .get("images")
        .ok_or_else(|| InpaintError::response_shape_error(ENDPOINT, "missing 'images' field"))?;

    let entries = images.as_array().ok_or_else(|| {
        InpaintError::response_shape_error(ENDPOINT, "'images' is not a list")
    })?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            ImageRecord::deserialize(entry).map_err(|e| {
                InpaintError::response_shape_error(
                    ENDPOINT,
                    &format!("entry {} of 'images' is malformed: {}", index, e),
                )
            })
        })
        .collect()
}

/// Identifier pair addressing one image in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorTarget {
    pub id: String,
    pub secret: String,
}

impl EditorTarget {
    #[must_use]
    pub fn new<I: Into<String>, S: Into<String>>(id: I, secret: S) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }

    /// Take the identifier pair from a matched record
    ///
    /// # Errors
    /// Record lacks an `id` or a `secret`, or either is not a string or number
    pub fn from_record(record: &ImageRecord) -> Result<Self> {
        let name = record.file_name().unwrap_or("<unnamed>");
        Ok(Self {
            id: opaque_token(&record.id, "id", name)?,
            secret: opaque_token(&record.secret, "secret", name)?,
        })
    }

    /// Editor page path, also used as the process `Referer`
    #[must_use]
    pub fn editor_path(&self) -> String {
        format!("editor/{}/{}/", self.id, self.secret)
    }

    #[must_use]
    pub fn process_path(&self) -> String {
        format!("{}process", self.editor_path())
    }
}
