//! Oracle prompts for fact mining

/// Build the fact-mining prompt for one chunk of segment text
pub fn fact_prompt(document_type: &str, chunk_text: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(FACT_INSTRUCTIONS);
    prompt.push_str(&format!("\n\nDocument type: {}\n", document_type));
    prompt.push_str("\nText to analyze:\n---\n");
    prompt.push_str(chunk_text);
    prompt.push_str("\n---\n\n");
    prompt.push_str(FACT_FORMAT_REMINDER);
    prompt
}

const FACT_INSTRUCTIONS: &str = r#"Extract discrete, atomic facts from the following excerpt of a legal
document. A fact is a single checkable statement: who did what, what was
owed, what was agreed, what was admitted, when something happened.

category must be one of: assertion, date, financial, obligation,
admission.

Rules:
- One idea per fact
- Quote amounts, dates, and names exactly as the text states them
- Do not infer facts the text does not state
- Confidence reflects how directly the text supports the statement,
  from 0.0 to 1.0"#;

const FACT_FORMAT_REMINDER: &str = r#"Output format (JSON array only, no additional text):
[
  {
    "text": "Acme agreed to pay $500 within 30 days.",
    "category": "obligation",
    "confidence": 0.9
  }
]

Return an empty array [] if the excerpt states no extractable facts.
Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_chunk_text() {
        let prompt = fact_prompt("contract", "Payment due in 30 days.");
        assert!(prompt.contains("Payment due in 30 days."));
        assert!(prompt.contains("Document type: contract"));
    }

    #[test]
    fn test_prompt_includes_instructions() {
        let prompt = fact_prompt("email", "x");
        assert!(prompt.contains("atomic facts"));
        assert!(prompt.contains("ONLY valid JSON"));
    }
}
