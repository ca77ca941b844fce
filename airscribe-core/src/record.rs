//! Boundary types for the external summary/record-generation service.
//!
//! The service consumes rendered pages and returns either free text or a list
//! of titled sections. Nothing in the drawing pipeline depends on its output.

use serde::{Deserialize, Serialize};

use crate::surface::RasterImage;
use crate::{ScribeError, ScribeResult};

/// Input for one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Rendered pages, in document order.
    pub images: Vec<RasterImage>,
    /// Extracted reference text, e.g. from an attached document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_text: Option<String>,
    /// Natural-language instruction.
    pub instruction: String,
}

impl RecordRequest {
    /// Build a request.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::Record`] if there are no images or the
    /// instruction is blank.
    pub fn new(
        images: Vec<RasterImage>,
        reference_text: Option<String>,
        instruction: impl Into<String>,
    ) -> ScribeResult<Self> {
        let instruction = instruction.into();
        if images.is_empty() {
            return Err(ScribeError::Record("at least one page image is required".into()));
        }
        if instruction.trim().is_empty() {
            return Err(ScribeError::Record("instruction is empty".into()));
        }
        Ok(Self {
            images,
            reference_text,
            instruction,
        })
    }
}

/// One titled part of a structured response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSection {
    /// Section heading.
    pub title: String,
    /// Section body.
    pub content: String,
}

/// What the service returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecordResponse {
    /// Unstructured text.
    Text(String),
    /// Structured sections.
    Sections(Vec<RecordSection>),
}

impl RecordResponse {
    /// Flatten to plain text, one `title: content` block per section.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Sections(sections) => sections
                .iter()
                .map(|s| format!("{}: {}", s.title, s.content))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

/// External record-generation capability.
pub trait RecordService {
    /// Run one generation.
    ///
    /// # Errors
    ///
    /// Implementations report transport or service failures.
    fn generate(&self, request: &RecordRequest) -> ScribeResult<RecordResponse>;
}

/// Interpret raw service output.
///
/// Markdown code fences are stripped; a JSON array of `{title, content}`
/// objects becomes [`RecordResponse::Sections`], anything else is kept as text.
#[must_use]
pub fn parse_record_response(raw: &str) -> RecordResponse {
    let body = strip_code_fence(raw.trim());
    match serde_json::from_str::<Vec<RecordSection>>(body) {
        Ok(sections) if !sections.is_empty() => RecordResponse::Sections(sections),
        _ => RecordResponse::Text(raw.trim().to_string()),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (`json`, ...) on the opening line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoService;

    impl RecordService for EchoService {
        fn generate(&self, request: &RecordRequest) -> ScribeResult<RecordResponse> {
            Ok(parse_record_response(&format!(
                "```json\n[{{\"title\":\"Pages\",\"content\":\"{}\"}}]\n```",
                request.images.len()
            )))
        }
    }

    #[test]
    fn test_parse_fenced_sections() {
        let raw = "```json\n[{\"title\":\"Summary\",\"content\":\"Fever\"},{\"title\":\"Plan\",\"content\":\"Rest\"}]\n```";
        let RecordResponse::Sections(sections) = parse_record_response(raw) else {
            panic!("expected sections");
        };
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].title, "Plan");
    }

    #[test]
    fn test_parse_bare_json() {
        let raw = r#"[{"title":"A","content":"B"}]"#;
        assert!(matches!(parse_record_response(raw), RecordResponse::Sections(_)));
    }

    #[test]
    fn test_parse_falls_back_to_text() {
        assert_eq!(
            parse_record_response("  The patient is well.  "),
            RecordResponse::Text("The patient is well.".to_string())
        );
        assert!(matches!(parse_record_response("[]"), RecordResponse::Text(_)));
        assert!(matches!(
            parse_record_response("```\nnot json\n```"),
            RecordResponse::Text(_)
        ));
    }

    #[test]
    fn test_request_validation() {
        assert!(RecordRequest::new(Vec::new(), None, "Summarize").is_err());
        assert!(RecordRequest::new(vec![RasterImage::png(vec![1])], None, "  ").is_err());
        let request =
            RecordRequest::new(vec![RasterImage::png(vec![1])], None, "Summarize").expect("ok");
        let response = EchoService.generate(&request).expect("generate");
        assert_eq!(response.to_text(), "Pages: 1");
    }
}
