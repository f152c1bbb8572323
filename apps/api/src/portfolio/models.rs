use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slug: String,
    pub published: bool,
    pub display_name: String,
    pub headline: String,
    pub bio: String,
    pub contact_email: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub value: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LinkRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub label: String,
    pub url: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperienceRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub company: String,
    pub role: String,
    pub date_start: String,
    pub date_end: String,
    pub highlights: Vec<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EducationRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub school: String,
    pub degree: String,
    pub date_start: String,
    pub date_end: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub name: String,
    pub description: String,
    pub url: String,
    pub highlights: Vec<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeUploadRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub s3_key: String,
    /// Extracted plain text, stored at upload time so parsing never has to
    /// re-read the blob.
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Full portfolio aggregate returned to callers: profile scalars plus every
/// child collection in `sort_order`, and the most recent uploads.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioView {
    #[serde(flatten)]
    pub portfolio: PortfolioRow,
    pub skills: Vec<SkillRow>,
    pub links: Vec<LinkRow>,
    pub experiences: Vec<ExperienceRow>,
    pub educations: Vec<EducationRow>,
    pub projects: Vec<ProjectRow>,
    pub resume_uploads: Vec<ResumeUploadRow>,
}
