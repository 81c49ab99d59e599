mod parrot;

use json::JsonValue;
use std::fmt::Display;

use crate::protocol::{ProtocolError, Result, StatusFormat};

pub use parrot::{extract_parrot_devices, ParrotDevice};

/// Status payload as handed to callers.
///
/// TEXT and XML are kept verbatim; JSON is parsed into a tagged value.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedStatus {
    Text(String),
    Xml(String),
    Json(JsonValue),
}

impl Display for NormalizedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizedStatus::Text(text) | NormalizedStatus::Xml(text) => text.fmt(f),
            NormalizedStatus::Json(value) => value.dump().fmt(f),
        }
    }
}

pub(crate) fn parse_json(raw: &str) -> Result<JsonValue> {
    json::parse(raw).map_err(|e| ProtocolError::MalformedPayload(e).into())
}

pub fn decode_status(raw: &str, format: StatusFormat) -> Result<NormalizedStatus> {
    Ok(match format {
        StatusFormat::Text => NormalizedStatus::Text(raw.to_string()),
        StatusFormat::Xml => NormalizedStatus::Xml(raw.to_string()),
        StatusFormat::Json => NormalizedStatus::Json(parse_json(raw)?),
    })
}
