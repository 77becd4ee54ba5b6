//! Parse oracle output into fact candidates

use crate::error::ExtractorError;
use crate::types::FactCandidate;
use docket_domain::FactCategory;
use serde_json::Value;
use tracing::warn;

/// Parse a fact-mining response into validated candidates.
///
/// Individual candidates that fail to parse or validate are skipped with
/// a warning (partial success).
pub fn parse_fact_response(response: &str) -> Result<Vec<FactCandidate>, ExtractorError> {
    let json_str = extract_json(response)?;
    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let array = json
        .as_array()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON array".to_string()))?;

    let mut candidates = Vec::new();
    for (idx, item) in array.iter().enumerate() {
        match parse_candidate_json(item) {
            Ok(candidate) => {
                if let Err(e) = candidate.validate() {
                    warn!("Fact candidate {} failed validation: {}", idx, e);
                    continue;
                }
                candidates.push(candidate);
            }
            Err(e) => {
                warn!("Failed to parse fact candidate {}: {}", idx, e);
            }
        }
    }

    Ok(candidates)
}

/// Extract JSON from a response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn parse_candidate_json(json: &Value) -> Result<FactCandidate, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Candidate is not a JSON object".to_string())?;

    let text = obj
        .get("text")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Missing or invalid 'text'".to_string())?
        .to_string();

    // Unknown category strings default to Assertion
    let category = obj
        .get("category")
        .and_then(|v| v.as_str())
        .map(FactCategory::parse)
        .unwrap_or_default();

    let confidence = obj
        .get("confidence")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| "Missing or invalid 'confidence'".to_string())?;

    Ok(FactCandidate {
        text,
        category,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_facts() {
        let response = r#"[
            {"text": "Acme agreed to pay $500.", "category": "obligation", "confidence": 0.9},
            {"text": "The term began on March 3, 2019.", "category": "date", "confidence": 0.85}
        ]"#;

        let candidates = parse_fact_response(response).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].category, FactCategory::Obligation);
        assert_eq!(candidates[1].category, FactCategory::Date);
    }

    #[test]
    fn test_parse_markdown_wrapped() {
        let response =
            "```json\n[{\"text\": \"x happened\", \"category\": \"assertion\", \"confidence\": 0.7}]\n```";
        let candidates = parse_fact_response(response).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_fact_response("[]").unwrap().is_empty());
    }

    #[test]
    fn test_not_json_is_error() {
        assert!(parse_fact_response("no facts here").is_err());
    }

    #[test]
    fn test_partial_success_skips_invalid() {
        let response = r#"[
            {"text": "valid fact", "category": "assertion", "confidence": 0.8},
            {"category": "assertion", "confidence": 0.8},
            {"text": "   ", "category": "assertion", "confidence": 0.8},
            {"text": "bad confidence", "category": "assertion", "confidence": 2.0}
        ]"#;

        let candidates = parse_fact_response(response).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "valid fact");
    }

    #[test]
    fn test_unknown_category_defaults_to_assertion() {
        let response = r#"[{"text": "x", "category": "rumor", "confidence": 0.5}]"#;
        let candidates = parse_fact_response(response).unwrap();
        assert_eq!(candidates[0].category, FactCategory::Assertion);
    }
}
