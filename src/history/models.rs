use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A parking-event instant at minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Accepts `YYYY-MM-DD HH:MM` and ISO-like `YYYY-MM-DDTHH:MM[:SS[.fff]][zone]`.
    /// Anything past the minutes is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let head = raw.trim().get(..16)?.replacen('T', " ", 1);
        NaiveDateTime::parse_from_str(&head, CANONICAL_FORMAT)
            .ok()
            .map(Timestamp)
    }

    /// Truncates to the minute so every value has a canonical text form.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Timestamp(
            dt.with_second(0)
                .and_then(|d| d.with_nanosecond(0))
                .unwrap_or(dt),
        )
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn to_canonical(&self) -> String {
        self.0.format(CANONICAL_FORMAT).to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}

/// A history record as it arrives from a data source, before any validation.
///
/// The live backend and the mock store disagree on field names, so every
/// field is looked up under each of its known spellings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHistoryRecord {
    pub id: Option<String>,
    pub area: Option<String>,
    pub gate: Option<String>,
    pub plate: Option<String>,
    pub entry: Option<String>,
    pub exit: Option<String>,
}

const ID_KEYS: &[&str] = &["_id", "id"];
const AREA_KEYS: &[&str] = &["area", "areaName", "areaNombre"];
const GATE_KEYS: &[&str] = &["puerta", "gate", "gateName"];
const PLATE_KEYS: &[&str] = &["placa", "plate"];
const ENTRY_KEYS: &[&str] = &["fechaEntrada", "entryTimestamp", "entrada"];
const EXIT_KEYS: &[&str] = &["fechaSalida", "exitTimestamp", "salida"];

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Labels come either as plain strings or as embedded documents (`{ "nombre": ... }`).
fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => ["nombre", "name"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(scalar_text)),
        other => scalar_text(other),
    }
}

fn first_of(
    obj: &serde_json::Map<String, Value>,
    keys: &[&str],
    read: fn(&Value) -> Option<String>,
) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k).and_then(read))
}

impl RawHistoryRecord {
    /// Reads a record out of an arbitrary JSON value; `None` if it is not an object.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let plate = first_of(obj, PLATE_KEYS, scalar_text).or_else(|| {
            obj.get("vehiculo")
                .and_then(|v| v.get("placa"))
                .and_then(scalar_text)
        });

        Some(Self {
            id: first_of(obj, ID_KEYS, scalar_text),
            area: first_of(obj, AREA_KEYS, label_text),
            gate: first_of(obj, GATE_KEYS, label_text),
            plate,
            entry: first_of(obj, ENTRY_KEYS, scalar_text),
            exit: first_of(obj, EXIT_KEYS, scalar_text),
        })
    }
}

impl From<&HistoryRecord> for RawHistoryRecord {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            area: Some(record.area_name.clone()),
            gate: Some(record.gate_name.clone()),
            plate: Some(record.plate.clone()),
            entry: Some(record.entry.to_canonical()),
            exit: record.exit.map(|t| t.to_canonical()),
        }
    }
}

/// One completed or ongoing parking event in canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub area_name: String,
    pub gate_name: String,
    pub plate: String,
    #[serde(rename = "entryTimestamp")]
    pub entry: Timestamp,
    #[serde(rename = "exitTimestamp")]
    pub exit: Option<Timestamp>,
}

impl HistoryRecord {
    pub fn entry_date(&self) -> NaiveDate {
        self.entry.date()
    }

    pub fn is_ongoing(&self) -> bool {
        self.exit.is_none()
    }

    /// Exit recorded before entry. Kept, but callers may want to flag it.
    pub fn has_inconsistent_exit(&self) -> bool {
        self.exit.is_some_and(|exit| exit < self.entry)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySection {
    pub title: String,
    pub records: Vec<HistoryRecord>,
}

/// One page of raw records plus whatever paging metadata the source reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryPage {
    pub records: Vec<RawHistoryRecord>,
    pub total: Option<u64>,
    pub pages: Option<u32>,
}

impl HistoryPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
