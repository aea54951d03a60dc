//! Semantic role classification.

use crate::model::Paragraph;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Inferred document-structural category of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    /// Manuscript title
    Title,
    /// Author list
    Author,
    /// Author affiliation
    Affiliation,
    /// Article type line
    ArticleType,
    /// DOI line
    DoiNumber,
    /// Abstract
    Abstract,
    /// Keyword list
    Keyword,
    /// Numbered/unnumbered heading, levels 1-4
    Heading(u8),
    /// Back matter (acknowledgements, funding, declarations)
    BackMatter,
    /// Body text (fallback)
    Body,
}

impl SemanticRole {
    /// Whether this role is any heading level.
    pub fn is_heading(&self) -> bool {
        matches!(self, SemanticRole::Heading(_))
    }
}

/// Style-name substrings checked in priority order; first match wins.
///
/// The order is fixed: a style named "Abstract Heading 2" must classify
/// as heading 2, not abstract, because heading rules come first.
const STYLE_RULES: &[(&str, SemanticRole)] = &[
    ("title", SemanticRole::Title),
    ("author", SemanticRole::Author),
    ("heading 1", SemanticRole::Heading(1)),
    ("heading 2", SemanticRole::Heading(2)),
    ("heading 3", SemanticRole::Heading(3)),
    ("heading 4", SemanticRole::Heading(4)),
    ("affiliation", SemanticRole::Affiliation),
    ("abstract", SemanticRole::Abstract),
    ("keyword", SemanticRole::Keyword),
    ("articletype", SemanticRole::ArticleType),
    ("doinum", SemanticRole::DoiNumber),
    ("backmatter", SemanticRole::BackMatter),
];

static DECIMAL_HEADING: OnceLock<Regex> = OnceLock::new();

fn decimal_heading_re() -> &'static Regex {
    DECIMAL_HEADING.get_or_init(|| Regex::new(r"^\d+(\.\d+)+$").unwrap())
}

/// Classify a paragraph by style name and text.
///
/// Pure and total: the same (style name, trimmed text) always yields the
/// same role, and anything unmatched falls back to [`SemanticRole::Body`].
/// Safe to call repeatedly while the document is being edited.
pub fn classify(paragraph: &Paragraph) -> SemanticRole {
    let style_name = paragraph
        .style_name
        .as_deref()
        .unwrap_or("")
        .to_lowercase();

    for (needle, role) in STYLE_RULES {
        if style_name.contains(needle) {
            return *role;
        }
    }

    // Documents without explicit heading styles still number their
    // headings: a bare "2.1" or "3.4.5" line is a heading even under a
    // body style. Level = number of dotted segments, capped at 4.
    let text = paragraph.text();
    let trimmed = text.trim();
    if decimal_heading_re().is_match(trimmed) {
        let level = trimmed.split('.').count().min(4) as u8;
        return SemanticRole::Heading(level);
    }

    SemanticRole::Body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(style: &str, text: &str) -> Paragraph {
        Paragraph::styled(style, text)
    }

    #[test]
    fn test_style_rules_priority() {
        assert_eq!(classify(&styled("Title", "x")), SemanticRole::Title);
        assert_eq!(classify(&styled("Author Names", "x")), SemanticRole::Author);
        assert_eq!(
            classify(&styled("Heading 2", "x")),
            SemanticRole::Heading(2)
        );
        assert_eq!(
            classify(&styled("Affiliation", "x")),
            SemanticRole::Affiliation
        );
        assert_eq!(classify(&styled("AbstractText", "x")), SemanticRole::Abstract);
        assert_eq!(classify(&styled("Keywords", "x")), SemanticRole::Keyword);
        assert_eq!(
            classify(&styled("ArticleType", "x")),
            SemanticRole::ArticleType
        );
        assert_eq!(classify(&styled("DoiNum", "x")), SemanticRole::DoiNumber);
        assert_eq!(
            classify(&styled("BackMatter", "x")),
            SemanticRole::BackMatter
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify(&styled("TITLE", "x")), SemanticRole::Title);
        assert_eq!(classify(&styled("heading 1", "x")), SemanticRole::Heading(1));
    }

    #[test]
    fn test_heading_beats_later_rules() {
        // "Abstract Heading 2" carries both substrings; heading wins by
        // priority order.
        assert_eq!(
            classify(&styled("Abstract Heading 2", "x")),
            SemanticRole::Heading(2)
        );
    }

    #[test]
    fn test_body_fallback() {
        assert_eq!(classify(&styled("Normal", "plain text")), SemanticRole::Body);
        assert_eq!(
            classify(&Paragraph::with_text("no style at all")),
            SemanticRole::Body
        );
    }

    #[test]
    fn test_decimal_heading_rule() {
        assert_eq!(
            classify(&Paragraph::with_text("2.1")),
            SemanticRole::Heading(2)
        );
        assert_eq!(
            classify(&Paragraph::with_text(" 3.4.5 ")),
            SemanticRole::Heading(3)
        );
        assert_eq!(
            classify(&Paragraph::with_text("1.2.3.4.5")),
            SemanticRole::Heading(4)
        );
        // A bare number is not a heading; neither is prose starting
        // with one.
        assert_eq!(classify(&Paragraph::with_text("2")), SemanticRole::Body);
        assert_eq!(
            classify(&Paragraph::with_text("2.1 Results")),
            SemanticRole::Body
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let p = styled("Heading 3", "Methods");
        assert_eq!(classify(&p), classify(&p));
    }
}
