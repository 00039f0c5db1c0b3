//! Stamps: the timestamped events that make up a note's timeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single timestamped occurrence with a kind and optional free text.
///
/// Within one note's timeline the `timestamp` is the primary key: two stamps
/// recorded at the exact same millisecond collide and one overwrites the
/// other. This is an accepted limitation of the data model, not a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampRecord {
    /// When the stamp was recorded, in milliseconds since the epoch.
    pub timestamp: i64,
    /// What happened.
    pub kind: StampKind,
    /// Free text entered by the operator. May be empty.
    pub note: String,
    /// Display name of the person who recorded the stamp. Present on
    /// multi-user shared notes, absent on single-user local notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

impl StampRecord {
    /// Creates an unattributed stamp.
    #[must_use]
    pub const fn new(timestamp: i64, kind: StampKind, note: String) -> Self {
        Self {
            timestamp,
            kind,
            note,
            operator: None,
        }
    }
}

/// The closed set of stamp kinds.
///
/// Each kind has a stable identifier (the SCREAMING_SNAKE name, used for
/// persistence) and a human-facing display label (used for CSV and display).
/// The set is extensible but must stay a closed, named enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StampKind {
    Sleep,
    WakeUp,
    Painful,
    Fun,
    Tantrum,
    Medication,
    Poo,
    Pee,
    Memo,
    Outing,
}

impl StampKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 10] = [
        Self::Sleep,
        Self::WakeUp,
        Self::Painful,
        Self::Fun,
        Self::Tantrum,
        Self::Medication,
        Self::Poo,
        Self::Pee,
        Self::Memo,
        Self::Outing,
    ];

    /// Stable identifier used for persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sleep => "SLEEP",
            Self::WakeUp => "WAKE_UP",
            Self::Painful => "PAINFUL",
            Self::Fun => "FUN",
            Self::Tantrum => "TANTRUM",
            Self::Medication => "MEDICATION",
            Self::Poo => "POO",
            Self::Pee => "PEE",
            Self::Memo => "MEMO",
            Self::Outing => "OUTING",
        }
    }

    /// Display label. This is what the CSV format carries in its kind column.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sleep => "ねる",
            Self::WakeUp => "おきる",
            Self::Painful => "つらい",
            Self::Fun => "たのしい",
            Self::Tantrum => "かんしゃく",
            Self::Medication => "おくすり",
            Self::Poo => "うんち",
            Self::Pee => "おしっこ",
            Self::Memo => "メモ",
            Self::Outing => "おでかけ",
        }
    }

    /// Resolves a display label back to a kind. Exact match only.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

impl fmt::Display for StampKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StampKind {
    type Err = UnknownStampKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownStampKind(s.to_string()))
    }
}

impl Serialize for StampKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StampKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown stamp kind identifiers.
#[derive(Debug, Clone)]
pub struct UnknownStampKind(String);

impl fmt::Display for UnknownStampKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown stamp kind: {}", self.0)
    }
}

impl std::error::Error for UnknownStampKind {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        for kind in StampKind::ALL {
            let s = kind.to_string();
            let parsed: StampKind = s.parse().expect("should parse");
            assert_eq!(parsed, kind, "roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn labels_resolve_back_to_kinds() {
        for kind in StampKind::ALL {
            assert_eq!(StampKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(StampKind::from_label("not a label"), None);
    }

    #[test]
    fn unknown_kind_errors() {
        let result: Result<StampKind, _> = "NAP".parse();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "unknown stamp kind: NAP");
    }

    #[test]
    fn stamp_serialization_roundtrip() {
        let stamp = StampRecord {
            timestamp: 1_700_000_000_000,
            kind: StampKind::Sleep,
            note: "お昼寝".into(),
            operator: Some("はは".into()),
        };

        let json = serde_json::to_string(&stamp).unwrap();
        let parsed: StampRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stamp);
    }

    #[test]
    fn operator_omitted_when_absent() {
        let stamp = StampRecord::new(1, StampKind::Memo, String::new());
        let json = serde_json::to_string(&stamp).unwrap();
        assert!(!json.contains("operator"));
    }
}
