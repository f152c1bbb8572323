//! Parsed-resume and portfolio-update contracts.
//!
//! Two validation modes cover the two producers of this data. The strict
//! contract gates AI output: a resume that passes it is directly usable.
//! The permissive contract gates hand-edited form submissions, where
//! incompleteness is expected mid-editing.
//!
//! Every array field deserializes to empty rather than absent, and every
//! optional scalar to the empty string, so downstream consumers never see
//! null.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const MAX_DISPLAY_NAME: usize = 100;
pub const MAX_HEADLINE: usize = 160;
pub const MAX_BIO: usize = 3000;
pub const MAX_LOCATION: usize = 120;
pub const MAX_LABEL: usize = 50;
pub const MAX_SKILLS: usize = 50;
pub const MAX_COLLECTION: usize = 20;

/// A single field-level violation, addressed by a flattened path such as
/// `links[0].url`.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Error)]
#[error("validation failed with {} violation(s)", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation {
                path: path.into(),
                message: message.into(),
            }],
        }
    }
}

/// Accumulates violations across a whole payload before failing, so the
/// caller can render every field-level problem at once.
#[derive(Debug, Default)]
struct Violations(Vec<Violation>);

impl Violations {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(Violation {
            path: path.into(),
            message: message.into(),
        });
    }

    fn into_result(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub start: String,
    pub end: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub url: String,
    pub highlights: Vec<String>,
}

/// The canonical structured record produced by resume extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedResume {
    pub name: String,
    pub headline: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub links: Vec<Link>,
}

impl ParsedResume {
    /// Strict contract for AI output: required text fields non-empty and
    /// every link URL a well-formed absolute URL.
    pub fn validate_strict(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::default();

        for (i, skill) in self.skills.iter().enumerate() {
            if skill.trim().is_empty() {
                violations.push(format!("skills[{i}]"), "skill must not be empty");
            }
        }

        for (i, exp) in self.experience.iter().enumerate() {
            if exp.company.trim().is_empty() {
                violations.push(format!("experience[{i}].company"), "company is required");
            }
            if exp.role.trim().is_empty() {
                violations.push(format!("experience[{i}].role"), "role is required");
            }
        }

        for (i, edu) in self.education.iter().enumerate() {
            if edu.school.trim().is_empty() {
                violations.push(format!("education[{i}].school"), "school is required");
            }
            if edu.degree.trim().is_empty() {
                violations.push(format!("education[{i}].degree"), "degree is required");
            }
        }

        for (i, project) in self.projects.iter().enumerate() {
            if project.name.trim().is_empty() {
                violations.push(format!("projects[{i}].name"), "project name is required");
            }
        }

        for (i, link) in self.links.iter().enumerate() {
            validate_label(&mut violations, &format!("links[{i}].label"), &link.label);
            if Url::parse(&link.url).is_err() {
                violations.push(
                    format!("links[{i}].url"),
                    "must be a well-formed absolute URL",
                );
            }
        }

        violations.into_result()
    }
}

/// Partial-update payload for direct user edits. Absent fields leave the
/// stored value untouched; present list fields fully replace the stored
/// collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioUpdate {
    pub display_name: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub contact_email: Option<String>,
    pub location: Option<String>,
    pub skills: Option<Vec<String>>,
    pub links: Option<Vec<Link>>,
    pub experiences: Option<Vec<Experience>>,
    pub educations: Option<Vec<Education>>,
    pub projects: Option<Vec<Project>>,
}

impl PortfolioUpdate {
    /// Permissive contract for hand-edited submissions: everything optional,
    /// empty strings allowed, only size bounds and link labels enforced.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::default();

        if let Some(name) = &self.display_name {
            if name.len() > MAX_DISPLAY_NAME {
                violations.push(
                    "display_name",
                    format!("must be at most {MAX_DISPLAY_NAME} characters"),
                );
            }
        }
        if let Some(headline) = &self.headline {
            if headline.len() > MAX_HEADLINE {
                violations.push(
                    "headline",
                    format!("must be at most {MAX_HEADLINE} characters"),
                );
            }
        }
        if let Some(bio) = &self.bio {
            if bio.len() > MAX_BIO {
                violations.push("bio", format!("must be at most {MAX_BIO} characters"));
            }
        }
        if let Some(email) = &self.contact_email {
            if !email.is_empty() && !is_email(email) {
                violations.push("contact_email", "must be a valid email address");
            }
        }
        if let Some(location) = &self.location {
            if location.len() > MAX_LOCATION {
                violations.push(
                    "location",
                    format!("must be at most {MAX_LOCATION} characters"),
                );
            }
        }

        if let Some(skills) = &self.skills {
            if skills.len() > MAX_SKILLS {
                violations.push("skills", format!("at most {MAX_SKILLS} skills"));
            }
            for (i, skill) in skills.iter().enumerate() {
                if skill.trim().is_empty() {
                    violations.push(format!("skills[{i}]"), "skill must not be empty");
                }
            }
        }

        if let Some(links) = &self.links {
            if links.len() > MAX_COLLECTION {
                violations.push("links", format!("at most {MAX_COLLECTION} links"));
            }
            for (i, link) in links.iter().enumerate() {
                validate_label(&mut violations, &format!("links[{i}].label"), &link.label);
            }
        }

        for (key, len) in [
            ("experiences", self.experiences.as_ref().map(Vec::len)),
            ("educations", self.educations.as_ref().map(Vec::len)),
            ("projects", self.projects.as_ref().map(Vec::len)),
        ] {
            if len.is_some_and(|len| len > MAX_COLLECTION) {
                violations.push(key, format!("at most {MAX_COLLECTION} entries"));
            }
        }

        violations.into_result()
    }
}

/// Maps a structured resume into a full-replace update: every scalar is
/// present (empty string included) and every collection replaces its stored
/// counterpart.
impl From<ParsedResume> for PortfolioUpdate {
    fn from(parsed: ParsedResume) -> Self {
        PortfolioUpdate {
            display_name: Some(parsed.name),
            headline: Some(parsed.headline),
            bio: Some(parsed.summary),
            contact_email: None,
            location: None,
            skills: Some(parsed.skills),
            links: Some(parsed.links),
            experiences: Some(parsed.experience),
            educations: Some(parsed.education),
            projects: Some(parsed.projects),
        }
    }
}

fn validate_label(violations: &mut Violations, path: &str, label: &str) {
    if label.is_empty() {
        violations.push(path, "label is required");
    } else if label.len() > MAX_LABEL {
        violations.push(path, format!("must be at most {MAX_LABEL} characters"));
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_resume() -> ParsedResume {
        ParsedResume {
            name: "Jane".to_string(),
            headline: "Engineer".to_string(),
            summary: "Builds products".to_string(),
            skills: vec!["Rust".to_string()],
            experience: vec![Experience {
                company: "Acme".to_string(),
                role: "Developer".to_string(),
                start: "2020".to_string(),
                end: "2022".to_string(),
                highlights: vec!["Built API".to_string()],
            }],
            education: vec![Education {
                school: "Uni".to_string(),
                degree: "BS".to_string(),
                start: "2016".to_string(),
                end: "2020".to_string(),
            }],
            projects: vec![Project {
                name: "Proj".to_string(),
                description: "Desc".to_string(),
                url: String::new(),
                highlights: vec!["Impact".to_string()],
            }],
            links: vec![Link {
                label: "GitHub".to_string(),
                url: "https://github.com/jane".to_string(),
            }],
        }
    }

    #[test]
    fn test_sparse_json_fills_defaults() {
        let parsed: ParsedResume = serde_json::from_str(r#"{"name": "Jane"}"#).unwrap();
        assert_eq!(parsed.name, "Jane");
        assert_eq!(parsed.headline, "");
        assert!(parsed.skills.is_empty());
        assert!(parsed.experience.is_empty());
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_nested_entities_fill_defaults() {
        let parsed: ParsedResume =
            serde_json::from_str(r#"{"experience": [{"company": "Acme"}]}"#).unwrap();
        assert_eq!(parsed.experience[0].company, "Acme");
        assert_eq!(parsed.experience[0].role, "");
        assert!(parsed.experience[0].highlights.is_empty());
    }

    #[test]
    fn test_strict_accepts_valid_resume() {
        assert!(valid_resume().validate_strict().is_ok());
    }

    #[test]
    fn test_strict_rejects_relative_link_url() {
        let mut resume = valid_resume();
        resume.links[0].url = "not-a-url".to_string();

        let err = resume.validate_strict().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].path, "links[0].url");
    }

    #[test]
    fn test_strict_rejects_empty_required_fields() {
        let mut resume = valid_resume();
        resume.experience[0].company = String::new();
        resume.education[0].degree = "  ".to_string();

        let err = resume.validate_strict().unwrap_err();
        let paths: Vec<_> = err.violations.iter().map(|v| v.path.as_str()).collect();
        assert!(paths.contains(&"experience[0].company"));
        assert!(paths.contains(&"education[0].degree"));
    }

    #[test]
    fn test_permissive_accepts_empty_update() {
        assert!(PortfolioUpdate::default().validate().is_ok());
    }

    #[test]
    fn test_permissive_accepts_empty_link_url() {
        let update = PortfolioUpdate {
            links: Some(vec![Link {
                label: "Site".to_string(),
                url: String::new(),
            }]),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_permissive_rejects_oversized_fields() {
        let update = PortfolioUpdate {
            headline: Some("x".repeat(MAX_HEADLINE + 1)),
            skills: Some(vec!["Rust".to_string(); MAX_SKILLS + 1]),
            ..Default::default()
        };

        let err = update.validate().unwrap_err();
        let paths: Vec<_> = err.violations.iter().map(|v| v.path.as_str()).collect();
        assert!(paths.contains(&"headline"));
        assert!(paths.contains(&"skills"));
    }

    #[test]
    fn test_permissive_rejects_bad_email() {
        let update = PortfolioUpdate {
            contact_email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = PortfolioUpdate {
            contact_email: Some("jane@example.com".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_resume_maps_to_full_replace_update() {
        let update = PortfolioUpdate::from(valid_resume());

        assert_eq!(update.display_name.as_deref(), Some("Jane"));
        assert_eq!(update.bio.as_deref(), Some("Builds products"));
        assert_eq!(update.skills.as_ref().unwrap().len(), 1);
        assert_eq!(update.experiences.as_ref().unwrap()[0].company, "Acme");
        assert_eq!(update.projects.as_ref().unwrap()[0].name, "Proj");
        // Scalars are always present so a full AI replace overwrites them,
        // even with empty strings.
        let empty = PortfolioUpdate::from(ParsedResume::default());
        assert_eq!(empty.display_name.as_deref(), Some(""));
        assert_eq!(empty.headline.as_deref(), Some(""));
    }
}
