//! PDF text extraction.
//!
//! `pdf-extract` walks the content streams directly: it rasterizes no
//! fonts and evaluates no embedded scripts, so extraction stays
//! deterministic and sandboxed by construction.

use super::ExtractError;

/// Extracts visible text. Text runs within a page are joined with single
/// spaces; page boundaries (form feeds in the extractor output) become
/// newlines.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let raw = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Failed(anyhow::anyhow!("{e}")))?;

    Ok(normalize_pages(&raw))
}

fn normalize_pages(raw: &str) -> String {
    raw.split('\u{c}')
        .map(collapse_runs)
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapses the extractor's internal line breaks and spacing into single
/// spaces, one line per page.
fn collapse_runs(page: &str) -> String {
    page.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_runs_joins_with_single_spaces() {
        assert_eq!(
            collapse_runs("Jane  Doe\nSenior   Engineer\n"),
            "Jane Doe Senior Engineer"
        );
    }

    #[test]
    fn test_normalize_pages_splits_on_form_feed() {
        assert_eq!(
            normalize_pages("Jane Doe\nEngineer\u{c}Page two\ncontent\u{c}"),
            "Jane Doe Engineer\nPage two content"
        );
    }

    #[test]
    fn test_normalize_pages_empty_input() {
        assert_eq!(normalize_pages("  \n \u{c} "), "");
    }

    #[test]
    fn test_extract_fails_on_garbage_bytes() {
        assert!(matches!(
            extract_text(b"definitely not a pdf"),
            Err(ExtractError::Failed(_))
        ));
    }
}
