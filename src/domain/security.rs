//! Content security validation for free-text metadata fields.
//!
//! The validator is a pure scanner: it reports which threat patterns a
//! value matches and leaves the accept/reject decision to the caller. It
//! never rewrites input; a flagged value is rejected outright before any
//! persistence happens.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatKind {
    ScriptInjection,
    EventHandler,
    JavascriptUrl,
    EmbeddedObject,
    CssExpression,
    DataUrlPayload,
    PathTraversal,
    CrlfInjection,
}

impl ThreatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreatKind::ScriptInjection => "script_injection",
            ThreatKind::EventHandler => "event_handler",
            ThreatKind::JavascriptUrl => "javascript_url",
            ThreatKind::EmbeddedObject => "embedded_object",
            ThreatKind::CssExpression => "css_expression",
            ThreatKind::DataUrlPayload => "data_url_payload",
            ThreatKind::PathTraversal => "path_traversal",
            ThreatKind::CrlfInjection => "crlf_injection",
        }
    }
}

/// A threat found in a named input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldThreat {
    pub field: &'static str,
    pub kind: ThreatKind,
}

static TEXT_PATTERNS: Lazy<Vec<(ThreatKind, Regex)>> = Lazy::new(|| {
    [
        (ThreatKind::ScriptInjection, r"(?i)<\s*/?\s*script\b"),
        (
            ThreatKind::EventHandler,
            r#"(?i)\bon[a-z]+\s*=\s*["']?[^"'>\s]"#,
        ),
        (ThreatKind::JavascriptUrl, r"(?i)javascript\s*:"),
        (
            ThreatKind::EmbeddedObject,
            r"(?i)<\s*(iframe|object|embed|form)\b",
        ),
        (ThreatKind::CssExpression, r"(?i)expression\s*\("),
        (
            ThreatKind::DataUrlPayload,
            r"(?i)data\s*:\s*text/html|data\s*:[^,]*;\s*base64",
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| {
        let regex = Regex::new(pattern).expect("threat pattern must compile");
        (kind, regex)
    })
    .collect()
});

static PATH_PATTERNS: Lazy<Vec<(ThreatKind, Regex)>> = Lazy::new(|| {
    [
        (ThreatKind::PathTraversal, r"\.\.[/\\]|%2e%2e"),
        (ThreatKind::CrlfInjection, r"[\r\n]|%0d|%0a"),
        (ThreatKind::JavascriptUrl, r"(?i)javascript\s*:"),
        (ThreatKind::ScriptInjection, r"(?i)<\s*/?\s*script\b"),
    ]
    .into_iter()
    .map(|(kind, pattern)| {
        let regex = Regex::new(pattern).expect("threat pattern must compile");
        (kind, regex)
    })
    .collect()
});

/// Scan a free-text value (title, description) for injection patterns.
pub fn scan_text(value: &str) -> Vec<ThreatKind> {
    scan_with(&TEXT_PATTERNS, value)
}

/// Scan a path or slug value; paths additionally reject traversal and
/// CRLF sequences.
pub fn scan_path(value: &str) -> Vec<ThreatKind> {
    scan_with(&PATH_PATTERNS, value)
}

fn scan_with(patterns: &[(ThreatKind, Regex)], value: &str) -> Vec<ThreatKind> {
    patterns
        .iter()
        .filter(|(_, regex)| regex.is_match(value))
        .map(|&(kind, _)| kind)
        .collect()
}

/// Scan a set of named fields, accumulating each threat with the field it
/// was found in. An empty result means all fields are clean.
pub fn scan_fields(fields: &[(&'static str, &str)]) -> Vec<FieldThreat> {
    let mut threats = Vec::new();
    for &(field, value) in fields {
        for kind in scan_text(value) {
            threats.push(FieldThreat { field, kind });
        }
    }
    threats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_passes() {
        assert!(scan_text("Cloud Engineering | Acme").is_empty());
        assert!(scan_text("Services for teams <3 shipping").is_empty());
    }

    #[test]
    fn script_tags_are_flagged() {
        let threats = scan_text("hello <script>alert(1)</script>");
        assert!(threats.contains(&ThreatKind::ScriptInjection));

        let threats = scan_text("< ScRiPt src=x>");
        assert!(threats.contains(&ThreatKind::ScriptInjection));
    }

    #[test]
    fn event_handlers_and_js_urls_are_flagged() {
        assert!(scan_text(r#"<img src=x onerror="alert(1)">"#).contains(&ThreatKind::EventHandler));
        assert!(scan_text("javascript:alert(1)").contains(&ThreatKind::JavascriptUrl));
        assert!(scan_text("JAVASCRIPT : alert(1)").contains(&ThreatKind::JavascriptUrl));
    }

    #[test]
    fn embedded_objects_and_data_urls_are_flagged() {
        assert!(scan_text("<iframe src=//evil>").contains(&ThreatKind::EmbeddedObject));
        assert!(scan_text("data:text/html,<b>x</b>").contains(&ThreatKind::DataUrlPayload));
        assert!(scan_text("data:image/png;base64,AAAA").contains(&ThreatKind::DataUrlPayload));
    }

    #[test]
    fn path_traversal_and_crlf_are_flagged() {
        assert!(scan_path("../../etc/passwd").contains(&ThreatKind::PathTraversal));
        assert!(scan_path("/ok%2e%2e/evil").contains(&ThreatKind::PathTraversal));
        assert!(scan_path("/a\r\nSet-Cookie: x").contains(&ThreatKind::CrlfInjection));
        assert!(scan_path("/services/ai-ml").is_empty());
    }

    #[test]
    fn field_scan_names_the_offending_field() {
        let threats = scan_fields(&[
            ("meta_title", "clean title"),
            ("meta_description", "<script>x</script>"),
        ]);
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].field, "meta_description");
        assert_eq!(threats[0].kind, ThreatKind::ScriptInjection);
    }
}
