//! Structured logging for ShipCheck.
//!
//! Console output (JSON or pretty), optional rolling NDJSON files, and
//! scrubbing of credentials from strings before they are logged.

pub mod logger;
pub mod redact;

pub use logger::{LogFormat, init_logger};
pub use redact::redact_sensitive_data;
