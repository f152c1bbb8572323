use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::ai_client::AiClient;
use crate::config::Config;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub ai: AiClient,
    /// In-process limiter guarding the extraction endpoint. Single-process
    /// counters only — a known scaling boundary.
    pub limiter: Arc<RateLimiter>,
    pub config: Config,
}
