//! Coerces free-text model replies into an [`InspectionVerdict`].
//!
//! This is the only place untrusted model output enters the domain types, so
//! every path ends in a valid verdict.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::{InspectionStatus, InspectionVerdict};

/// Recommendation used when the reply could not be read as a verdict.
pub const FALLBACK_RECOMMENDATION: &str = "Provide corrective actions per SOLAS/ISM and re-inspect.";

/// Maximum number of characters of the reply kept in a fallback description.
pub const FALLBACK_DESCRIPTION_CHARS: usize = 1000;

/// Normalize a model reply into a verdict. Never fails.
///
/// The JSON candidate is the span from the first `{` to the last `}` (not a
/// balanced scan), so prose or markdown fences around the object are tolerated.
/// A fallback description is taken from that same candidate, not the whole reply.
pub fn normalize_reply(text: &str) -> InspectionVerdict {
    let candidate = json_candidate(text);
    match parse_verdict(candidate) {
        Some(verdict) => {
            debug!(status = %verdict.status, "parsed structured verdict");
            verdict
        }
        None => {
            warn!(reply_chars = text.chars().count(), "reply is not a JSON verdict, using fallback");
            fallback_verdict(candidate)
        }
    }
}

fn json_candidate(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end >= start => &text[start..=end],
        // `}` before `{` leaves nothing parseable
        (Some(_), Some(_)) => "",
        _ => text,
    }
}

fn parse_verdict(candidate: &str) -> Option<InspectionVerdict> {
    let value: Value = serde_json::from_str(candidate).ok()?;
    let object = value.as_object()?;

    let status = object
        .get("status")
        .and_then(Value::as_str)
        .and_then(|s| InspectionStatus::from_label(&s.to_uppercase()))
        .unwrap_or(InspectionStatus::Yellow);

    Some(InspectionVerdict {
        status,
        description: text_field(object, "description")?,
        recommendation: text_field(object, "recommendation")?,
    })
}

/// Absent or null reads as empty; any non-string value rejects the reply.
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key) {
        None | Some(Value::Null) => Some(String::new()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => None,
    }
}

fn fallback_verdict(candidate: &str) -> InspectionVerdict {
    InspectionVerdict {
        status: InspectionStatus::Yellow,
        description: candidate.trim().chars().take(FALLBACK_DESCRIPTION_CHARS).collect(),
        recommendation: FALLBACK_RECOMMENDATION.to_string(),
    }
}
