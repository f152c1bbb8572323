use std::time::Duration;

use axum::extract::{Multipart, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{self, DocumentFormat, RawDocument};
use crate::portfolio::models::{PortfolioView, ResumeUploadRow};
use crate::portfolio::queries::{self, get_or_create};
use crate::portfolio::slug::{generate_unique_slug, normalize_slug};
use crate::portfolio::sync::apply_update;
use crate::schemas::{PortfolioUpdate, ValidationError};
use crate::state::AppState;
use crate::storage;

const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;
const MIN_SLUG_LEN: usize = 2;
const MAX_SLUG_LEN: usize = 60;
const PARSE_RATE_LIMIT: u32 = 10;
const PARSE_RATE_WINDOW: Duration = Duration::from_secs(10 * 60);
/// Uploads kept per portfolio; older ones are pruned best-effort.
const KEPT_UPLOADS: i64 = 5;

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
    /// Optional display name used to seed the slug on first access.
    pub display_name: Option<String>,
}

/// GET /api/v1/portfolio
pub async fn handle_get_portfolio(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<PortfolioView>, AppError> {
    let portfolio =
        get_or_create(&state.db, params.user_id, params.display_name.as_deref()).await?;
    let view = read_back(&state, portfolio.id).await?;
    Ok(Json(view))
}

/// PUT /api/v1/portfolio
///
/// Permissive-validates the partial update, then synchronizes it in one
/// transaction. List fields present in the body fully replace their stored
/// collections.
pub async fn handle_update_portfolio(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
    Json(update): Json<PortfolioUpdate>,
) -> Result<Json<PortfolioView>, AppError> {
    update.validate()?;

    let portfolio =
        get_or_create(&state.db, params.user_id, params.display_name.as_deref()).await?;
    apply_update(&state.db, portfolio.id, &update, None).await?;

    let view = read_back(&state, portfolio.id).await?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct SlugRequest {
    pub slug: String,
}

#[derive(Serialize)]
pub struct SlugResponse {
    pub slug: String,
    pub published: bool,
}

/// PUT /api/v1/portfolio/slug
///
/// Publishes the portfolio under a unique handle derived from the request.
/// The probe excludes the caller's own portfolio so re-publishing the same
/// handle is a no-op rather than a collision.
pub async fn handle_publish_slug(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
    Json(req): Json<SlugRequest>,
) -> Result<Json<SlugResponse>, AppError> {
    if req.slug.len() < MIN_SLUG_LEN || req.slug.len() > MAX_SLUG_LEN {
        return Err(ValidationError::single(
            "slug",
            format!("must be {MIN_SLUG_LEN}-{MAX_SLUG_LEN} characters"),
        )
        .into());
    }

    let portfolio =
        get_or_create(&state.db, params.user_id, params.display_name.as_deref()).await?;
    let requested = normalize_slug(&req.slug);

    let unique = generate_unique_slug(&requested, |candidate| {
        let pool = state.db.clone();
        async move { queries::slug_exists(&pool, &candidate, Some(portfolio.id)).await }
    })
    .await?;

    sqlx::query("UPDATE portfolios SET slug = $1, published = TRUE, updated_at = now() WHERE id = $2")
        .bind(&unique)
        .bind(portfolio.id)
        .execute(&state.db)
        .await?;

    info!(user_id = %params.user_id, slug = %unique, "Published portfolio");
    Ok(Json(SlugResponse {
        slug: unique,
        published: true,
    }))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub upload: UploadSummary,
}

#[derive(Serialize)]
pub struct UploadSummary {
    pub id: Uuid,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// POST /api/v1/resume/upload
///
/// Multipart intake boundary: size ceiling and format allowlist are
/// enforced here, before the core ever sees the bytes. Extraction runs off
/// the async executor; the blob is persisted only after text extraction
/// succeeds.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut document: Option<RawDocument> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ValidationError::single("file", format!("invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("resume").to_string();
            let media_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(|e| {
                ValidationError::single("file", format!("failed to read upload: {e}"))
            })?;
            document = Some(RawDocument {
                bytes,
                media_type,
                file_name,
            });
        }
    }

    let document =
        document.ok_or_else(|| ValidationError::single("file", "Resume file is required"))?;

    if document.bytes.len() > MAX_RESUME_BYTES {
        return Err(ValidationError::single("file", "Resume must be 10MB or less").into());
    }
    if DocumentFormat::detect(&document.media_type, &document.file_name).is_none() {
        return Err(AppError::UnsupportedFormat);
    }

    // Parsing is CPU-bound; keep it off the async executor.
    let parse_input = document.clone();
    let content = tokio::task::spawn_blocking(move || extract::extract(&parse_input))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    let s3_key = storage::save_resume(
        &state.s3,
        &state.config.s3_bucket,
        &document.file_name,
        &document.media_type,
        document.bytes.clone(),
    )
    .await?;

    let portfolio =
        get_or_create(&state.db, params.user_id, params.display_name.as_deref()).await?;

    let row: ResumeUploadRow = sqlx::query_as(
        r#"
        INSERT INTO resume_uploads (portfolio_id, file_name, file_type, s3_key, content)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(portfolio.id)
    .bind(&document.file_name)
    .bind(&document.media_type)
    .bind(&s3_key)
    .bind(&content)
    .fetch_one(&state.db)
    .await?;

    prune_superseded_uploads(&state, portfolio.id).await;

    info!(user_id = %params.user_id, upload_id = %row.id, "Stored resume upload");
    Ok(Json(UploadResponse {
        upload: UploadSummary {
            id: row.id,
            file_name: row.file_name,
            created_at: row.created_at,
        },
    }))
}

#[derive(Deserialize)]
pub struct ParseRequest {
    pub upload_id: Uuid,
}

/// POST /api/v1/resume/parse
///
/// The full ingestion pipeline: rate-limit gate, stored upload lookup,
/// structured extraction with one repair round-trip, then a transactional
/// full replace of the portfolio. The caller gets back either the complete
/// new profile or an error with the store untouched.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<PortfolioView>, AppError> {
    let key = format!("parse:{}", params.user_id);
    if !state
        .limiter
        .allow(&key, PARSE_RATE_LIMIT, PARSE_RATE_WINDOW)
    {
        warn!(user_id = %params.user_id, "Resume parse rate limit hit");
        return Err(AppError::RateLimited);
    }

    let portfolio =
        get_or_create(&state.db, params.user_id, params.display_name.as_deref()).await?;

    let upload: ResumeUploadRow =
        sqlx::query_as("SELECT * FROM resume_uploads WHERE id = $1 AND portfolio_id = $2")
            .bind(req.upload_id)
            .bind(portfolio.id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume upload not found".to_string()))?;

    let parsed = state.ai.extract_structured(&upload.content).await?;

    let raw_json = serde_json::to_value(&parsed)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("serializing parsed resume: {e}")))?;
    let update = PortfolioUpdate::from(parsed);

    apply_update(&state.db, portfolio.id, &update, Some(&raw_json)).await?;

    let view = read_back(&state, portfolio.id).await?;
    info!(user_id = %params.user_id, upload_id = %req.upload_id, "Applied structured resume to portfolio");
    Ok(Json(view))
}

async fn read_back(state: &AppState, portfolio_id: Uuid) -> Result<PortfolioView, AppError> {
    queries::get_portfolio_view(&state.db, portfolio_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio {portfolio_id} not found")))
}

/// Keeps the most recent uploads and removes the rest. Best-effort: a
/// failure here is logged and never escalated, since the upload that
/// triggered it has already committed.
async fn prune_superseded_uploads(state: &AppState, portfolio_id: Uuid) {
    let stale: Vec<ResumeUploadRow> = match sqlx::query_as(
        "SELECT * FROM resume_uploads WHERE portfolio_id = $1 ORDER BY created_at DESC OFFSET $2",
    )
    .bind(portfolio_id)
    .bind(KEPT_UPLOADS)
    .fetch_all(&state.db)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Failed to list superseded uploads for {portfolio_id}: {e}");
            return;
        }
    };

    for row in stale {
        storage::delete_resume(&state.s3, &state.config.s3_bucket, &row.s3_key).await;
        if let Err(e) = sqlx::query("DELETE FROM resume_uploads WHERE id = $1")
            .bind(row.id)
            .execute(&state.db)
            .await
        {
            warn!("Failed to delete superseded upload {}: {e}", row.id);
        }
    }
}
