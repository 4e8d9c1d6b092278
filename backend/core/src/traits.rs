use anyhow::Result;
use async_trait::async_trait;

/// A vision-language model that looks at one image and answers in free text.
///
/// Implementations send exactly one upstream request per call and keep no
/// state between calls. Any transport failure or non-success status is an
/// error; nothing is retried.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Model identifier reported by the health endpoint and in logs.
    fn model(&self) -> &str;

    /// Analyze raw image bytes and return the model's reply text.
    async fn analyze(&self, image: &[u8]) -> Result<String>;
}
