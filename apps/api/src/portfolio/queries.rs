//! Portfolio lookups and the ordered read-back of the full aggregate.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::portfolio::models::{
    EducationRow, ExperienceRow, LinkRow, PortfolioRow, PortfolioView, ProjectRow,
    ResumeUploadRow, SkillRow,
};
use crate::portfolio::slug::generate_unique_slug;

/// How many recent uploads the aggregate view carries.
const RECENT_UPLOADS: i64 = 5;

pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<PortfolioRow>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioRow>("SELECT * FROM portfolios WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Reports whether `candidate` is already taken, optionally ignoring the
/// portfolio being re-slugged.
pub async fn slug_exists(
    pool: &PgPool,
    candidate: &str,
    exclude: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let existing: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM portfolios WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(candidate)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;

    Ok(existing.is_some())
}

/// Returns the caller's portfolio, creating it on first access with a
/// unique slug derived from the display hint.
///
/// The slug is unique at probe time; the UNIQUE constraints on `user_id`
/// and `slug` close the race against concurrent first requests, surfacing
/// as a database error the caller may retry.
pub async fn get_or_create(
    pool: &PgPool,
    user_id: Uuid,
    display_hint: Option<&str>,
) -> Result<PortfolioRow, AppError> {
    if let Some(existing) = find_by_user(pool, user_id).await? {
        return Ok(existing);
    }

    let desired = display_hint.unwrap_or_default();
    let slug = generate_unique_slug(desired, |candidate| async move {
        slug_exists(pool, &candidate, None).await
    })
    .await?;

    let row: PortfolioRow =
        sqlx::query_as("INSERT INTO portfolios (user_id, slug) VALUES ($1, $2) RETURNING *")
            .bind(user_id)
            .bind(&slug)
            .fetch_one(pool)
            .await?;

    info!("Created portfolio {} for user {user_id} with slug '{slug}'", row.id);
    Ok(row)
}

/// Reads the full portfolio aggregate; every child collection comes back
/// ordered by its zero-based `sort_order`.
pub async fn get_portfolio_view(
    pool: &PgPool,
    portfolio_id: Uuid,
) -> Result<Option<PortfolioView>, sqlx::Error> {
    let Some(portfolio) =
        sqlx::query_as::<_, PortfolioRow>("SELECT * FROM portfolios WHERE id = $1")
            .bind(portfolio_id)
            .fetch_optional(pool)
            .await?
    else {
        return Ok(None);
    };

    let skills = sqlx::query_as::<_, SkillRow>(
        "SELECT * FROM skills WHERE portfolio_id = $1 ORDER BY sort_order ASC",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await?;

    let links = sqlx::query_as::<_, LinkRow>(
        "SELECT * FROM links WHERE portfolio_id = $1 ORDER BY sort_order ASC",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await?;

    let experiences = sqlx::query_as::<_, ExperienceRow>(
        "SELECT * FROM experiences WHERE portfolio_id = $1 ORDER BY sort_order ASC",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await?;

    let educations = sqlx::query_as::<_, EducationRow>(
        "SELECT * FROM educations WHERE portfolio_id = $1 ORDER BY sort_order ASC",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await?;

    let projects = sqlx::query_as::<_, ProjectRow>(
        "SELECT * FROM projects WHERE portfolio_id = $1 ORDER BY sort_order ASC",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await?;

    let resume_uploads = sqlx::query_as::<_, ResumeUploadRow>(
        "SELECT * FROM resume_uploads WHERE portfolio_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(portfolio_id)
    .bind(RECENT_UPLOADS)
    .fetch_all(pool)
    .await?;

    Ok(Some(PortfolioView {
        portfolio,
        skills,
        links,
        experiences,
        educations,
        projects,
        resume_uploads,
    }))
}
