use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Traffic-light outcome of an inspection photo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum InspectionStatus {
    Green,
    /// Needs attention. Used whenever the model's answer can't be trusted.
    #[default]
    Yellow,
    Red,
}

impl InspectionStatus {
    /// Parse an exact uppercase status label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "GREEN" => Some(Self::Green),
            "YELLOW" => Some(Self::Yellow),
            "RED" => Some(Self::Red),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized judgment for a single photo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InspectionVerdict {
    pub status: InspectionStatus,
    pub description: String,
    pub recommendation: String,
}

/// A verdict tagged with the name of the file it was produced for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileVerdict {
    pub filename: String,
    #[serde(flatten)]
    pub verdict: InspectionVerdict,
}

/// Ordered verdicts for a batch upload, one per input file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub results: Vec<FileVerdict>,
}

/// One uploaded image, held only for the duration of a request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&InspectionStatus::Green).unwrap(),
            "\"GREEN\""
        );
        assert_eq!(InspectionStatus::from_label("RED"), Some(InspectionStatus::Red));
        assert_eq!(InspectionStatus::from_label("red"), None);
    }

    #[test]
    fn file_verdict_is_flat_and_ordered() {
        let fv = FileVerdict {
            filename: "deck.jpg".into(),
            verdict: InspectionVerdict {
                status: InspectionStatus::Red,
                description: "corroded railing".into(),
                recommendation: "replace".into(),
            },
        };
        let json = serde_json::to_string(&fv).unwrap();
        assert_eq!(
            json,
            r#"{"filename":"deck.jpg","status":"RED","description":"corroded railing","recommendation":"replace"}"#
        );
    }
}
