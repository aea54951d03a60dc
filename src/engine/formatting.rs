//! The formatting primitive: apply a normalized role format to a
//! paragraph.

use crate::model::{Alignment, Paragraph, ParagraphProps};
use serde::{Deserialize, Serialize};

/// A normalized (font, size, weight, slant, underline, alignment)
/// tuple for one semantic role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSpec {
    /// Font family
    pub font: String,

    /// Font size in points
    pub size_pts: f32,

    /// Force bold
    pub bold: bool,

    /// Force italic
    pub italic: bool,

    /// Force underline
    pub underline: bool,

    /// Paragraph alignment
    pub alignment: Option<Alignment>,
}

impl FormatSpec {
    /// Create a regular-weight spec.
    pub fn new(font: impl Into<String>, size_pts: f32) -> Self {
        Self {
            font: font.into(),
            size_pts,
            bold: false,
            italic: false,
            underline: false,
            alignment: None,
        }
    }

    /// Set bold and return self.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Set italic and return self.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Set underline and return self.
    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Set alignment and return self.
    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }
}

/// Apply a format spec to a paragraph, resetting pre-existing
/// paragraph-level properties to neutral values first.
///
/// Run-level policy: font, size, slant, underline, and color are
/// overwritten; bold is only forced on, never stripped — a run that was
/// bold in the input stays bold. A paragraph with no runs still gets
/// its paragraph-level properties set.
pub fn apply_formatting(paragraph: &mut Paragraph, spec: &FormatSpec) {
    paragraph.props = ParagraphProps {
        alignment: spec.alignment,
        left_indent_twips: Some(0),
        right_indent_twips: Some(0),
        first_line_indent_twips: Some(0),
        space_before_pts: Some(0.0),
        space_after_pts: Some(0.0),
        line_spacing: None,
        widow_control: Some(false),
        keep_together: Some(false),
        keep_with_next: Some(false),
        ..ParagraphProps::default()
    };

    for run in &mut paragraph.runs {
        let was_bold = run.props.bold == Some(true);
        run.props.font = Some(spec.font.clone());
        run.props.size_pts = Some(spec.size_pts);
        run.props.bold = Some(spec.bold || was_bold);
        run.props.italic = Some(spec.italic);
        run.props.underline = Some(spec.underline);
        run.props.color = Some("000000".into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Run, RunProps};

    #[test]
    fn test_apply_formatting_rewrites_runs() {
        let mut p = Paragraph::with_text("Some Title");
        let spec = FormatSpec::new("Minion Pro", 14.0)
            .bold()
            .align(Alignment::Left);
        apply_formatting(&mut p, &spec);

        let run = &p.runs[0];
        assert_eq!(run.props.font.as_deref(), Some("Minion Pro"));
        assert_eq!(run.props.size_pts, Some(14.0));
        assert_eq!(run.props.bold, Some(true));
        assert_eq!(run.props.italic, Some(false));
        assert_eq!(run.props.color.as_deref(), Some("000000"));
        assert_eq!(p.props.alignment, Some(Alignment::Left));
        assert_eq!(p.props.first_line_indent_twips, Some(0));
    }

    #[test]
    fn test_preserves_preexisting_bold() {
        let mut p = Paragraph::new();
        p.add_run(Run::styled(
            "emphasized",
            RunProps {
                bold: Some(true),
                ..Default::default()
            },
        ));
        apply_formatting(&mut p, &FormatSpec::new("Minion Pro", 10.0));
        assert_eq!(p.runs[0].props.bold, Some(true));
    }

    #[test]
    fn test_empty_paragraph_does_not_panic() {
        let mut p = Paragraph::new();
        let spec = FormatSpec::new("Minion Pro", 10.0).align(Alignment::Justify);
        apply_formatting(&mut p, &spec);
        assert_eq!(p.props.alignment, Some(Alignment::Justify));
        assert_eq!(p.props.left_indent_twips, Some(0));
    }
}
