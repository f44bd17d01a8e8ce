//! Versioned JSON wrapper around stored item records.
//!
//! Values written by this crate look like `{"schemaVersion": 2, "payload": {...}}`.
//! Older stores hold bare objects, which are recognised by shape instead.

use crate::error::EngineResult;
use crate::models::mastery_record::{CurrentMasteryRecord, LegacyMasteryRecord, MasteryRecord};
use crate::models::migration::needs_migration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const LEGACY_SCHEMA: u32 = 1;
pub const CURRENT_SCHEMA: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    schema_version: u32,
    payload: Value,
}

pub fn encode(record: &CurrentMasteryRecord) -> EngineResult<String> {
    let envelope = Envelope {
        schema_version: CURRENT_SCHEMA,
        payload: serde_json::to_value(record)?,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decodes a stored string. Anything unreadable yields `None` and a warning.
pub fn decode(raw: &str) -> Option<MasteryRecord> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => decode_value(value),
        Err(e) => {
            log::warn!("discarding unparsable mastery record: {e}");
            None
        }
    }
}

/// Envelope version first; bare values fall back to shape sniffing.
pub fn decode_value(value: Value) -> Option<MasteryRecord> {
    let is_envelope = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("schemaVersion") && obj.contains_key("payload"));

    if is_envelope {
        let envelope: Envelope = match serde_json::from_value(value) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!("malformed record envelope: {e}");
                return None;
            }
        };
        return match envelope.schema_version {
            LEGACY_SCHEMA => legacy(envelope.payload),
            CURRENT_SCHEMA => current(envelope.payload),
            other => {
                log::warn!("unknown record schema version {other}");
                None
            }
        };
    }

    if needs_migration(&value) {
        legacy(value)
    } else {
        current(value)
    }
}

fn legacy(payload: Value) -> Option<MasteryRecord> {
    serde_json::from_value::<LegacyMasteryRecord>(payload)
        .map(MasteryRecord::Legacy)
        .map_err(|e| log::warn!("unreadable legacy record: {e}"))
        .ok()
}

fn current(payload: Value) -> Option<MasteryRecord> {
    serde_json::from_value::<CurrentMasteryRecord>(payload)
        .map(MasteryRecord::Current)
        .map_err(|e| log::warn!("unreadable mastery record: {e}"))
        .ok()
}
