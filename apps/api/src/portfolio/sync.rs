//! Transactional replace-all synchronization of a portfolio and its ordered
//! child collections.
//!
//! Each present collection is a value-level set replacement: delete every
//! row for the portfolio, reinsert the incoming rows tagged with their
//! zero-based position. There is deliberately no diff/merge — full replace
//! is the contract, and an empty incoming list clears the collection.

use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::schemas::{Education, Experience, Link, PortfolioUpdate, Project};

/// Applies a validated update to the portfolio scalars and its five child
/// collections as one atomic unit.
///
/// Scalars are written only when present in the update; collections present
/// in the update are fully replaced, absent ones left untouched. The
/// optional raw extraction snapshot commits in the same transaction.
/// Any failure rolls every effect back — a partially-applied profile is
/// never observable.
pub async fn apply_update(
    pool: &PgPool,
    portfolio_id: Uuid,
    update: &PortfolioUpdate,
    raw_json: Option<&Value>,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await.map_err(AppError::Sync)?;

    update_scalars(&mut tx, portfolio_id, update).await?;

    if let Some(raw) = raw_json {
        sqlx::query(
            r#"
            INSERT INTO parsed_resumes (portfolio_id, raw_json, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (portfolio_id) DO UPDATE SET raw_json = $2, updated_at = now()
            "#,
        )
        .bind(portfolio_id)
        .bind(raw)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Sync)?;
    }

    if let Some(skills) = &update.skills {
        replace_skills(&mut tx, portfolio_id, skills).await?;
    }
    if let Some(links) = &update.links {
        replace_links(&mut tx, portfolio_id, links).await?;
    }
    if let Some(experiences) = &update.experiences {
        replace_experiences(&mut tx, portfolio_id, experiences).await?;
    }
    if let Some(educations) = &update.educations {
        replace_educations(&mut tx, portfolio_id, educations).await?;
    }
    if let Some(projects) = &update.projects {
        replace_projects(&mut tx, portfolio_id, projects).await?;
    }

    tx.commit().await.map_err(AppError::Sync)?;
    info!("Synchronized portfolio {portfolio_id}");
    Ok(())
}

/// Writes only the scalar fields present in the update; NULL binds fall
/// through COALESCE and leave the column unchanged.
async fn update_scalars(
    tx: &mut Transaction<'_, Postgres>,
    portfolio_id: Uuid,
    update: &PortfolioUpdate,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE portfolios SET
            display_name = COALESCE($2, display_name),
            headline = COALESCE($3, headline),
            bio = COALESCE($4, bio),
            contact_email = COALESCE($5, contact_email),
            location = COALESCE($6, location),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(portfolio_id)
    .bind(update.display_name.as_deref())
    .bind(update.headline.as_deref())
    .bind(update.bio.as_deref())
    .bind(update.contact_email.as_deref())
    .bind(update.location.as_deref())
    .execute(&mut **tx)
    .await
    .map_err(AppError::Sync)?;

    Ok(())
}

async fn replace_skills(
    tx: &mut Transaction<'_, Postgres>,
    portfolio_id: Uuid,
    skills: &[String],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM skills WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Sync)?;

    for (order, value) in skills.iter().enumerate() {
        sqlx::query("INSERT INTO skills (portfolio_id, value, sort_order) VALUES ($1, $2, $3)")
            .bind(portfolio_id)
            .bind(value)
            .bind(order as i32)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Sync)?;
    }
    Ok(())
}

async fn replace_links(
    tx: &mut Transaction<'_, Postgres>,
    portfolio_id: Uuid,
    links: &[Link],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM links WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Sync)?;

    for (order, link) in links.iter().enumerate() {
        sqlx::query(
            "INSERT INTO links (portfolio_id, label, url, sort_order) VALUES ($1, $2, $3, $4)",
        )
        .bind(portfolio_id)
        .bind(&link.label)
        .bind(&link.url)
        .bind(order as i32)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Sync)?;
    }
    Ok(())
}

async fn replace_experiences(
    tx: &mut Transaction<'_, Postgres>,
    portfolio_id: Uuid,
    experiences: &[Experience],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM experiences WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Sync)?;

    for (order, exp) in experiences.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO experiences
                (portfolio_id, company, role, date_start, date_end, highlights, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(portfolio_id)
        .bind(&exp.company)
        .bind(&exp.role)
        .bind(&exp.start)
        .bind(&exp.end)
        .bind(&exp.highlights)
        .bind(order as i32)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Sync)?;
    }
    Ok(())
}

async fn replace_educations(
    tx: &mut Transaction<'_, Postgres>,
    portfolio_id: Uuid,
    educations: &[Education],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM educations WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Sync)?;

    for (order, edu) in educations.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO educations
                (portfolio_id, school, degree, date_start, date_end, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(portfolio_id)
        .bind(&edu.school)
        .bind(&edu.degree)
        .bind(&edu.start)
        .bind(&edu.end)
        .bind(order as i32)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Sync)?;
    }
    Ok(())
}

async fn replace_projects(
    tx: &mut Transaction<'_, Postgres>,
    portfolio_id: Uuid,
    projects: &[Project],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM projects WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Sync)?;

    for (order, project) in projects.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO projects
                (portfolio_id, name, description, url, highlights, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(portfolio_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.url)
        .bind(&project.highlights)
        .bind(order as i32)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Sync)?;
    }
    Ok(())
}
