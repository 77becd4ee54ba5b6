//! Parse oracle output into boundary candidates and classifications

use crate::classifier::Classification;
use crate::error::SegmenterError;
use crate::windower::PageWindow;
use docket_domain::{BoundaryCandidate, DocumentType, IdRange};
use serde_json::Value;
use tracing::warn;

/// Parse a boundary-detection response for one window.
///
/// Individual candidates that fail validation or fall outside the window
/// are skipped with a warning; the remainder survive (partial success).
pub fn parse_boundary_response(
    response: &str,
    window: &PageWindow,
) -> Result<Vec<BoundaryCandidate>, SegmenterError> {
    let json_str = extract_json(response)?;
    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| SegmenterError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let array = json
        .as_array()
        .ok_or_else(|| SegmenterError::InvalidFormat("Expected JSON array".to_string()))?;

    let mut candidates = Vec::new();
    for (idx, item) in array.iter().enumerate() {
        match parse_candidate_json(item, window.index) {
            Ok(candidate) => {
                if let Err(e) = candidate.validate() {
                    warn!("Candidate {} failed validation: {}", idx, e);
                    continue;
                }
                if !window.pages.contains(candidate.page) {
                    warn!(
                        "Candidate {} at page {} is outside window {}-{}",
                        idx, candidate.page, window.pages.start, window.pages.end
                    );
                    continue;
                }
                candidates.push(candidate);
            }
            Err(e) => {
                warn!("Failed to parse candidate {}: {}", idx, e);
            }
        }
    }

    Ok(candidates)
}

/// Parse a classification response for one segment
pub fn parse_classification_response(response: &str) -> Result<Classification, SegmenterError> {
    let json_str = extract_json(response)?;
    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| SegmenterError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let obj = json
        .as_object()
        .ok_or_else(|| SegmenterError::InvalidFormat("Expected JSON object".to_string()))?;

    // Missing or unknown type maps to Unclassified, not an error
    let document_type = obj
        .get("document_type")
        .and_then(|v| v.as_str())
        .map(DocumentType::parse)
        .unwrap_or_default();

    let title = obj
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let id_range = IdRange {
        first: obj
            .get("id_first")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        last: obj
            .get("id_last")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
    };

    let confidence = obj
        .get("confidence")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    Ok(Classification {
        document_type,
        title,
        id_range,
        confidence,
    })
}

/// Extract JSON from a response, handling markdown code blocks
pub(crate) fn extract_json(response: &str) -> Result<String, SegmenterError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(SegmenterError::InvalidFormat("Empty code block".to_string()));
        }
        // Skip the opening fence line and the closing fence
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn parse_candidate_json(json: &Value, source_window: usize) -> Result<BoundaryCandidate, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Candidate is not a JSON object".to_string())?;

    let page = obj
        .get("page")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| "Missing or invalid 'page'".to_string())?;
    let page = u32::try_from(page).map_err(|_| format!("Page {} out of range", page))?;

    let confidence = obj
        .get("confidence")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| "Missing or invalid 'confidence'".to_string())?;

    let evidence = obj
        .get("evidence")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(BoundaryCandidate {
        page,
        confidence,
        evidence,
        source_window,
    })
}
