//! Resume blob storage on S3/MinIO.
//!
//! Only upload persistence and cleanup live here; the extraction core never
//! touches storage.

use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
pub async fn build_s3_client(config: &Config) -> S3Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "folio-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    S3Client::new(&s3_config)
}

/// Stores an uploaded resume blob and returns its object key.
pub async fn save_resume(
    s3: &S3Client,
    bucket: &str,
    file_name: &str,
    media_type: &str,
    bytes: Bytes,
) -> Result<String, AppError> {
    let key = format!("resumes/{}-{}", Uuid::new_v4(), safe_file_name(file_name));

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(bytes))
        .content_type(media_type)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Stored resume upload at s3://{bucket}/{key}");
    Ok(key)
}

/// Best-effort delete of a superseded resume blob. Failure is logged, never
/// escalated — cleanup must not block the upload that triggered it.
pub async fn delete_resume(s3: &S3Client, bucket: &str, key: &str) {
    if let Err(e) = s3.delete_object().bucket(bucket).key(key).send().await {
        warn!("Failed to delete superseded resume s3://{bucket}/{key}: {e}");
    }
}

fn safe_file_name(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
