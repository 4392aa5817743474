use thiserror::Error;

use super::models::{HistoryRecord, RawHistoryRecord, Timestamp};

pub const DEFAULT_AREA_LABEL: &str = "Área no especificada";
pub const DEFAULT_GATE_LABEL: &str = "Puerta no especificada";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("record has no id")]
    MissingId,

    #[error("record {0} has no entry timestamp")]
    MissingEntry(String),

    #[error("record {id} has an unreadable entry timestamp '{raw}'")]
    BadEntry { id: String, raw: String },

    #[error("record {id} has an unreadable exit timestamp '{raw}'")]
    BadExit { id: String, raw: String },
}

fn label_or(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Maps a raw record onto the canonical shape, validating both timestamps.
pub fn normalize(raw: &RawHistoryRecord) -> Result<HistoryRecord, NormalizeError> {
    let id = raw
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingId)?
        .to_string();

    let entry_raw = raw
        .entry
        .as_deref()
        .ok_or_else(|| NormalizeError::MissingEntry(id.clone()))?;
    let entry = Timestamp::parse(entry_raw).ok_or_else(|| NormalizeError::BadEntry {
        id: id.clone(),
        raw: entry_raw.to_string(),
    })?;

    let exit = match raw.exit.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(text) => Some(Timestamp::parse(text).ok_or_else(|| NormalizeError::BadExit {
            id: id.clone(),
            raw: text.to_string(),
        })?),
    };

    Ok(HistoryRecord {
        area_name: label_or(raw.area.as_deref(), DEFAULT_AREA_LABEL),
        gate_name: label_or(raw.gate.as_deref(), DEFAULT_GATE_LABEL),
        plate: raw.plate.as_deref().map(str::trim).unwrap_or_default().to_string(),
        id,
        entry,
        exit,
    })
}

/// Normalizes a whole page, dropping records that fail validation.
pub fn normalize_page(raws: &[RawHistoryRecord]) -> Vec<HistoryRecord> {
    raws.iter()
        .filter_map(|raw| match normalize(raw) {
            Ok(record) => {
                if record.has_inconsistent_exit() {
                    log::warn!(
                        "History record {} exits ({}) before it enters ({})",
                        record.id,
                        record.exit.map(|t| t.to_canonical()).unwrap_or_default(),
                        record.entry
                    );
                }
                Some(record)
            }
            Err(e) => {
                log::warn!("Dropping history record: {}", e);
                None
            }
        })
        .collect()
}
