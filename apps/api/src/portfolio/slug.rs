//! URL handle generation for published portfolios.

use std::future::Future;

/// Fallback handle used when normalization strips everything.
const FALLBACK_SLUG: &str = "portfolio";

/// Lowercases and reduces input to hyphen-separated ASCII letters and
/// digits, collapsing runs of separators and trimming boundary hyphens.
/// Idempotent.
pub fn normalize_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Probes candidates until the existence check reports a free one.
/// Suffixes count up from 2: `base`, `base-2`, `base-3`, …
///
/// Uniqueness holds only at probe time. The caller must write through a
/// unique constraint and retry allocation if that write is rejected by a
/// concurrent publish.
pub async fn generate_unique_slug<F, Fut, E>(desired: &str, exists: F) -> Result<String, E>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let base = normalize_slug(desired);
    let mut candidate = base.clone();
    let mut count = 1u32;

    while exists(candidate.clone()).await? {
        count += 1;
        candidate = format!("{base}-{count}");
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::convert::Infallible;

    use super::*;

    #[test]
    fn test_normalizes_display_text() {
        assert_eq!(normalize_slug("John Doe Portfolio!"), "john-doe-portfolio");
        assert_eq!(normalize_slug("  --Jane--  "), "jane");
        assert_eq!(normalize_slug("Ada_Lovelace (1815)"), "ada-lovelace-1815");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["John Doe Portfolio!", "a--b", "éàç", "RUST 101"] {
            let once = normalize_slug(input);
            assert_eq!(normalize_slug(&once), once);
        }
    }

    #[test]
    fn test_empty_result_falls_back() {
        assert_eq!(normalize_slug(""), "portfolio");
        assert_eq!(normalize_slug("!!!"), "portfolio");
        assert_eq!(normalize_slug("日本語"), "portfolio");
    }

    #[tokio::test]
    async fn test_returns_base_when_free() {
        let slug = generate_unique_slug("John Doe", |_candidate| async {
            Ok::<_, Infallible>(false)
        })
        .await
        .unwrap();
        assert_eq!(slug, "john-doe");
    }

    #[tokio::test]
    async fn test_probes_past_collisions() {
        let existing: HashSet<String> = ["john-doe", "john-doe-2"]
            .into_iter()
            .map(String::from)
            .collect();

        let slug = generate_unique_slug("john doe", |candidate| {
            let taken = existing.contains(&candidate);
            async move { Ok::<_, Infallible>(taken) }
        })
        .await
        .unwrap();

        assert_eq!(slug, "john-doe-3");
    }
}
