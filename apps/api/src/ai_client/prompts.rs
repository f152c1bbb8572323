// Resume extraction prompt templates.
// All completion-provider prompts for the extraction pipeline live here.

/// System prompt: forces bare-JSON output for every extraction call.
pub const EXTRACT_SYSTEM: &str =
    "You extract structured resume data. Return JSON only. No markdown, no commentary.";

pub const EXTRACT_PROMPT_PREFIX: &str = r#"Extract this resume into JSON with this exact shape:

{
  "name": string,
  "headline": string,
  "summary": string,
  "skills": string[],
  "experience": [{ "company": string, "role": string, "start": string, "end": string, "highlights": string[] }],
  "education": [{ "school": string, "degree": string, "start": string, "end": string }],
  "projects": [{ "name": string, "description": string, "url": string, "highlights": string[] }],
  "links": [{ "label": string, "url": string }]
}

Resume text:
"#;

pub const REPAIR_PROMPT_PREFIX: &str =
    "Repair the following into valid JSON for the required schema and return only JSON:\n\n";
