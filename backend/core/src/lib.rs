pub mod error;
pub mod inspector;
pub mod normalize;
pub mod traits;
pub mod types;

pub use error::InspectionError;
pub use inspector::{inspect_batch, inspect_upload};
pub use normalize::{normalize_reply, FALLBACK_RECOMMENDATION, FALLBACK_DESCRIPTION_CHARS};
pub use traits::VisionClient;
pub use types::{BatchReport, FileVerdict, ImageUpload, InspectionStatus, InspectionVerdict};
