//! Curator prompt template.

/// Headings the model is instructed to return, in order.
pub const SECTION_HEADINGS: [&str; 5] = [
    "Name",
    "Origin",
    "Time Period",
    "Historical Significance",
    "Interesting Facts",
];

const CURATOR_INSTRUCTIONS: &str = "
You are an expert museum curator and historian.

Analyze the provided artifact image and the user prompt (if any). Generate a structured, concise description in the exact format below.

Return ONLY the following sections:

- Name:
- Origin:
- Time Period:
- Historical Significance:
- Interesting Facts:
    • Fact 1
    • Fact 2
    • Fact 3

Guidelines:
- If the exact artifact is uncertain, make the best reasonable identification.
- Keep it informative, neutral, and engaging.
- 120–180 words total.
";

/// Builds the full instruction text, appending `user_prompt` verbatim when it
/// is present and non-empty.
pub fn build_prompt(user_prompt: Option<&str>) -> String {
    let mut prompt = CURATOR_INSTRUCTIONS.to_string();
    if let Some(context) = user_prompt.filter(|p| !p.is_empty()) {
        prompt.push_str("\nUser prompt/context: ");
        prompt.push_str(context);
    }
    prompt
}

/// Returns the expected headings that do not appear in `text`.
///
/// The response is provider-controlled; this is only used to flag drift in
/// the logs, never to reject a description.
pub fn missing_sections(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    SECTION_HEADINGS
        .iter()
        .copied()
        .filter(|heading| !lower.contains(&heading.to_lowercase()))
        .collect()
}
