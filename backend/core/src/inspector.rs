//! Upload → upstream → normalizer glue, for one file or an ordered batch.

use anyhow::Result;
use tracing::{info, instrument};

use crate::normalize::normalize_reply;
use crate::traits::VisionClient;
use crate::types::{BatchReport, FileVerdict, ImageUpload};

/// Inspect a single upload. Upstream failures propagate unchanged.
#[instrument(skip_all, fields(model = client.model(), filename = %upload.filename, bytes = upload.bytes.len()))]
pub async fn inspect_upload(client: &dyn VisionClient, upload: &ImageUpload) -> Result<FileVerdict> {
    let reply = client.analyze(&upload.bytes).await?;
    let verdict = normalize_reply(&reply);
    info!(status = %verdict.status, "inspection complete");
    Ok(FileVerdict {
        filename: upload.filename.clone(),
        verdict,
    })
}

/// Inspect uploads one at a time, in input order.
///
/// The first upstream failure aborts the whole batch; there are no partial results.
#[instrument(skip_all, fields(files = uploads.len()))]
pub async fn inspect_batch(client: &dyn VisionClient, uploads: &[ImageUpload]) -> Result<BatchReport> {
    let mut results = Vec::with_capacity(uploads.len());
    for upload in uploads {
        results.push(inspect_upload(client, upload).await?);
    }
    Ok(BatchReport { results })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::InspectionError;
    use crate::types::InspectionStatus;

    /// Echoes the image bytes back as the description; fails on call `fail_on`.
    struct EchoClient {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl EchoClient {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), fail_on: None }
        }

        fn failing_on(call: usize) -> Self {
            Self { calls: AtomicUsize::new(0), fail_on: Some(call) }
        }
    }

    #[async_trait]
    impl VisionClient for EchoClient {
        fn model(&self) -> &str {
            "echo"
        }

        async fn analyze(&self, image: &[u8]) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on == Some(call) {
                return Err(InspectionError::UpstreamStatus { status: 502, body: "bad gateway".into() }.into());
            }
            Ok(format!(
                r#"{{"status":"green","description":"{}","recommendation":"call {}"}}"#,
                String::from_utf8_lossy(image),
                call
            ))
        }
    }

    #[tokio::test]
    async fn single_upload_keeps_filename() {
        let client = EchoClient::new();
        let fv = inspect_upload(&client, &ImageUpload::new("bow.jpg", "rusty")).await.unwrap();
        assert_eq!(fv.filename, "bow.jpg");
        assert_eq!(fv.verdict.status, InspectionStatus::Green);
        assert_eq!(fv.verdict.description, "rusty");
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let client = EchoClient::new();
        let uploads: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|s| ImageUpload::new(format!("{s}.jpg"), s.to_string()))
            .collect();

        let report = inspect_batch(&client, &uploads).await.unwrap();
        assert_eq!(report.results.len(), 4);
        for (i, fv) in report.results.iter().enumerate() {
            assert_eq!(fv.filename, uploads[i].filename);
            assert_eq!(fv.verdict.recommendation, format!("call {}", i + 1));
        }
    }

    #[tokio::test]
    async fn batch_fails_whole_on_first_upstream_error() {
        let client = EchoClient::failing_on(2);
        let uploads = vec![
            ImageUpload::new("1.jpg", "one"),
            ImageUpload::new("2.jpg", "two"),
            ImageUpload::new("3.jpg", "three"),
        ];
        let err = inspect_batch(&client, &uploads).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InspectionError>(),
            Some(InspectionError::UpstreamStatus { status: 502, .. })
        ));
        // stops at the failing item
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_batch_is_empty_report() {
        let client = EchoClient::new();
        let report = inspect_batch(&client, &[]).await.unwrap();
        assert!(report.results.is_empty());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}
