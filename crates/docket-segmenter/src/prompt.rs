//! Oracle prompts for boundary detection and classification

use crate::windower::PageWindow;
use docket_domain::PageRange;

/// Build the boundary-detection prompt for one window.
///
/// `page_texts[i]` is the text of page `window.pages.start + i`. Pages
/// are tagged so the oracle can report boundaries by page number.
pub fn boundary_prompt(window: &PageWindow, page_texts: &[String]) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Window pages: {}-{}\n\n",
        window.pages.start, window.pages.end
    ));
    prompt.push_str(BOUNDARY_INSTRUCTIONS);
    prompt.push_str("\n\nPages to analyze:\n---\n");

    for (offset, text) in page_texts.iter().enumerate() {
        let page = window.pages.start + offset as u32;
        prompt.push_str(&format!("[PAGE {}]\n{}\n\n", page, text));
    }

    prompt.push_str("---\n\n");
    prompt.push_str(BOUNDARY_FORMAT_REMINDER);
    prompt
}

/// Build the classification prompt for one finalized segment
pub fn classification_prompt(pages: PageRange, text: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(CLASSIFY_INSTRUCTIONS);
    prompt.push_str(&format!(
        "\n\nSegment pages {}-{}:\n---\n{}\n---\n\n",
        pages.start, pages.end, text
    ));
    prompt.push_str(CLASSIFY_FORMAT_REMINDER);
    prompt
}

const BOUNDARY_INSTRUCTIONS: &str = r#"You are analyzing consecutive pages from a legal document production.
Identify every page at which a NEW logical document begins.

Signals of a document boundary:
- New letterhead, caption, or title page
- A date line or salutation starting fresh correspondence
- Email headers (From/To/Subject) after non-email content
- Signature block followed by unrelated content
- Restarting page numbering ("Page 1 of N")

Rules:
- Report the page where the new document STARTS
- The first page of the window is only a boundary if a new document
  visibly begins there; continuation from the previous window is not
- Confidence reflects how strong the signals are, from 0.0 to 1.0"#;

const BOUNDARY_FORMAT_REMINDER: &str = r#"Output format (JSON array only, no additional text):
[
  {
    "page": 14,
    "confidence": 0.85,
    "evidence": ["new letterhead", "date line"]
  }
]

Return an empty array [] if no document starts within these pages.
Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

const CLASSIFY_INSTRUCTIONS: &str = r#"Classify the following logical document from a legal production.

document_type must be one of: correspondence, email, contract,
financial_record, pleading, minutes, report, other.

Also report:
- a short descriptive title (a few words)
- the first and last stamped identifiers (e.g., Bates numbers like
  "ACME-000123") visible on the pages, or empty strings if none
- your classification confidence from 0.0 to 1.0"#;

const CLASSIFY_FORMAT_REMINDER: &str = r#"Output format (JSON object only, no additional text):
{
  "document_type": "contract",
  "title": "Master Services Agreement",
  "id_first": "ACME-000123",
  "id_last": "ACME-000130",
  "confidence": 0.9
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: u32, end: u32) -> PageWindow {
        PageWindow {
            index: 0,
            pages: PageRange::new(start, end).unwrap(),
        }
    }

    #[test]
    fn test_boundary_prompt_tags_pages() {
        let texts = vec!["first page".to_string(), "second page".to_string()];
        let prompt = boundary_prompt(&window(9, 10), &texts);

        assert!(prompt.starts_with("Window pages: 9-10\n"));
        assert!(prompt.contains("[PAGE 9]\nfirst page"));
        assert!(prompt.contains("[PAGE 10]\nsecond page"));
    }

    #[test]
    fn test_boundary_prompt_includes_instructions() {
        let prompt = boundary_prompt(&window(1, 1), &["x".to_string()]);
        assert!(prompt.contains("NEW logical document"));
        assert!(prompt.contains("ONLY valid JSON"));
    }

    #[test]
    fn test_classification_prompt_includes_segment() {
        let pages = PageRange::new(9, 20).unwrap();
        let prompt = classification_prompt(pages, "MASTER SERVICES AGREEMENT");

        assert!(prompt.contains("Segment pages 9-20"));
        assert!(prompt.contains("MASTER SERVICES AGREEMENT"));
        assert!(prompt.contains("document_type"));
    }
}
