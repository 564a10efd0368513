// All LLM prompt constants for the screening module.

use crate::screening::criteria::CriteriaRow;

/// CV text beyond this many characters never reaches the model. Bounds
/// prompt size and cost per pair.
pub const CV_PROMPT_CHAR_CAP: usize = 3500;

/// System prompt for candidate scoring — recruiter persona, weighted
/// rubric, and JSON-only output with the exact four-key schema.
pub const SCREEN_SYSTEM: &str = "You are an elite technical recruiter at a Fortune 500 company. \
    Strictly evaluate the candidate CV against the provided role criteria. \
    SCORING RUBRIC: \
    1. Education match (20%): exact degree/field match. \
    2. Experience (30%): deduct points for low experience. \
    3. Skills (30%): check for the required tools and languages. \
    4. Domain relevance (20%): fit with the target domain. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    The JSON object must have EXACTLY these keys: \
    {\"name\": \"candidate name\", \"score\": integer 0-100, \
    \"status\": \"Shortlisted\" or \"Rejected\", \
    \"summary\": \"one sentence of specific feedback\"}";

/// Scoring prompt template. `{cv_text}` is substituted last so criteria
/// placeholders are never rewritten inside CV content.
pub const SCREEN_PROMPT_TEMPLATE: &str = r#"TARGET ROLE: {role}
REQUIRED SKILLS: {skills}
REQUIRED EXPERIENCE: {experience}

CANDIDATE CV CONTENT:
{cv_text}"#;

/// Builds the user prompt for one (document, criteria-row) pair.
pub fn build_screen_prompt(cv_text: &str, row: &CriteriaRow) -> String {
    SCREEN_PROMPT_TEMPLATE
        .replace("{role}", &row.role)
        .replace("{skills}", &row.skills)
        .replace("{experience}", &row.experience)
        .replace("{cv_text}", truncate_chars(cv_text, CV_PROMPT_CHAR_CAP))
}

/// Truncates to at most `cap` characters without splitting a code point.
fn truncate_chars(text: &str, cap: usize) -> &str {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> CriteriaRow {
        CriteriaRow {
            role: "Backend Engineer".to_string(),
            skills: "Rust, SQL".to_string(),
            experience: "5 years".to_string(),
        }
    }

    #[test]
    fn test_prompt_embeds_criteria_and_cv() {
        let prompt = build_screen_prompt("Jane Doe, ten years of Rust.", &row());
        assert!(prompt.contains("TARGET ROLE: Backend Engineer"));
        assert!(prompt.contains("REQUIRED SKILLS: Rust, SQL"));
        assert!(prompt.contains("REQUIRED EXPERIENCE: 5 years"));
        assert!(prompt.contains("Jane Doe, ten years of Rust."));
    }

    #[test]
    fn test_cv_text_truncated_at_cap() {
        // 'x' appears nowhere in the template or the criteria fixture.
        let cv_text = "x".repeat(CV_PROMPT_CHAR_CAP + 500);
        let prompt = build_screen_prompt(&cv_text, &row());
        let embedded_len = prompt.matches('x').count();
        assert_eq!(embedded_len, CV_PROMPT_CHAR_CAP);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // Multi-byte content must not be split mid code point.
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 4), "éééé");
        assert_eq!(truncate_chars(&text, 100), text.as_str());
    }

    #[test]
    fn test_placeholders_in_cv_text_survive() {
        // CV content mentioning a template placeholder must pass through
        // untouched.
        let prompt = build_screen_prompt("worked on {role} templating", &row());
        assert!(prompt.contains("worked on {role} templating"));
    }
}
