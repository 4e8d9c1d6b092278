use thiserror::Error;

/// Error taxonomy for an inspection request.
///
/// Malformed model replies never show up here: the normalizer always turns
/// them into a verdict.
#[derive(Debug, Error)]
pub enum InspectionError {
    /// No upstream credential configured. Reported to callers as a payload,
    /// not as an HTTP failure.
    #[error("OPENAI_API_KEY is not set")]
    MissingCredential,

    #[error("vision API returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("vision API reply contained no message content")]
    EmptyReply,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
