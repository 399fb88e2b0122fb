use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Channel through which attendance evidence arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    ManualEncoding,
    SelfPhoto,
    QrScan,
}

impl EvidenceSource {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EvidenceSource::ManualEncoding => "manual_encoding",
            EvidenceSource::SelfPhoto => "self_photo",
            EvidenceSource::QrScan => "qr_scan",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "manual_encoding" => Some(EvidenceSource::ManualEncoding),
            "self_photo" => Some(EvidenceSource::SelfPhoto),
            "qr_scan" => Some(EvidenceSource::QrScan),
            _ => None,
        }
    }

    /// Helper: convert CLI input (`manual`, `photo`, `qr`, or the DB names).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "manual" | "m" => Some(EvidenceSource::ManualEncoding),
            "photo" | "p" | "self" => Some(EvidenceSource::SelfPhoto),
            "qr" | "q" | "scan" => Some(EvidenceSource::QrScan),
            other => Self::from_db_str(other),
        }
    }
}

/// Evidence as delivered by one of the capture paths, before normalisation.
/// Every field except the source may be missing.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub source: EvidenceSource,
    #[serde(default)]
    pub scholar_id: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub raw_status: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    /// QR only: this scan closes an earlier check-in.
    #[serde(default)]
    pub checkout: bool,
}

impl RawEvent {
    pub fn new(source: EvidenceSource) -> Self {
        Self {
            source,
            scholar_id: None,
            occurred_at: None,
            completed_at: None,
            location: None,
            raw_status: None,
            reference: None,
            checkout: false,
        }
    }
}

/// One normalised, append-only evidence record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceEvent {
    pub id: i64, // 0 until appended
    pub scholar_id: String,
    pub source: EvidenceSource,
    pub occurred_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub location: String,
    pub raw_status: Option<String>,
    pub reference: Option<String>,
    pub recorded_at: NaiveDateTime,
}

impl AttendanceEvent {
    pub fn occurred_on(&self) -> NaiveDate {
        self.occurred_at.date()
    }

    /// A checker explicitly encoded this scholar as absent.
    pub fn is_explicit_absent(&self) -> bool {
        self.raw_status.as_deref() == Some("Absent")
    }
}
