use json::JsonValue;
use log::debug;

use super::parse_json;
use crate::protocol::{ProtocolError, Result};

const PARROT_STATUS_KEY: &str = "parrotStatus";
const ENTRY_TAG: &str = "entry";

/// A signal learned by the device's parrot memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParrotDevice {
    pub id: u32,
    pub name: String,
    pub protocol: String,
}

fn parse_entry(key: &str, value: &JsonValue) -> Option<ParrotDevice> {
    let id = key.strip_prefix(ENTRY_TAG)?.parse().ok()?;
    if !value.is_object() {
        return None;
    }

    Some(ParrotDevice {
        id,
        name: value["reminder"].as_str().unwrap_or_default().to_string(),
        protocol: value["protocol"].as_str().unwrap_or_default().to_string(),
    })
}

/// Learned devices listed in a JSON PARROT status.
///
/// Entries that cannot be read are skipped; only a payload that is not
/// JSON, or not a parrot status at all, is an error. Order is unspecified.
pub fn extract_parrot_devices(raw: &str) -> Result<Vec<ParrotDevice>> {
    let status = parse_json(raw)?;

    let entries = match &status[PARROT_STATUS_KEY] {
        JsonValue::Object(entries) => entries,
        _ => return Err(ProtocolError::InvalidFormat.into()),
    };

    Ok(entries
        .iter()
        .filter(|(key, _)| key.starts_with(ENTRY_TAG))
        .filter_map(|(key, value)| {
            let device = parse_entry(key, value);
            if device.is_none() {
                debug!("skipping parrot entry {:?}", key);
            }
            device
        })
        .collect())
}
