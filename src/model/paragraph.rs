//! Paragraph and run-level types.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A paragraph: an ordered sequence of runs plus paragraph-level
/// formatting and the name of its originating style.
///
/// Text content is always the concatenation of run texts. Semantic role
/// is never stored here; it is re-derived from (style name, text) after
/// every structural edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Resolved display name of the paragraph style (e.g. "Heading 1")
    pub style_name: Option<String>,

    /// Original style id (e.g. "Heading1"), kept for write-back
    pub style_id: Option<String>,

    /// Paragraph-level formatting
    pub props: ParagraphProps,

    /// Runs in document order
    pub runs: Vec<Run>,

    /// Index into `Document::sections` when this paragraph carries a
    /// section break (a `w:sectPr` inside its properties)
    pub section_break: Option<usize>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with a single plain-text run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a paragraph with a style name and a single text run.
    pub fn styled(style_name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut p = Self::with_text(text);
        let name: String = style_name.into();
        p.style_id = Some(name.replace(' ', ""));
        p.style_name = Some(name);
        p
    }

    /// Append a plain-text run.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.runs.push(Run::new(text));
    }

    /// Append a run.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Full text content (concatenation of run texts).
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::text).collect()
    }

    /// Whether the paragraph has no visible text.
    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }

    /// Whether any run carries a non-whitespace text span.
    pub fn has_text(&self) -> bool {
        !self.is_blank()
    }

    /// Whether any run carries an embedded drawing.
    pub fn has_drawing(&self) -> bool {
        self.runs.iter().any(Run::has_drawing)
    }

    /// Whether every run that carries visible text is bold.
    ///
    /// Blank runs and drawing-only runs are ignored. A paragraph with no
    /// text runs at all is not considered all-bold.
    pub fn all_text_runs_bold(&self) -> bool {
        let mut saw_text = false;
        for run in &self.runs {
            if run.text().trim().is_empty() {
                continue;
            }
            saw_text = true;
            if run.props.bold != Some(true) {
                return false;
            }
        }
        saw_text
    }
}

/// Paragraph-level formatting properties.
///
/// `None` means "inherit from the style"; the formatting primitive sets
/// explicit values to pin the house style regardless of inheritance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProps {
    /// Text alignment
    pub alignment: Option<Alignment>,

    /// Left indent in twips
    pub left_indent_twips: Option<i64>,

    /// Right indent in twips
    pub right_indent_twips: Option<i64>,

    /// First-line indent in twips
    pub first_line_indent_twips: Option<i64>,

    /// Space before the paragraph in points
    pub space_before_pts: Option<f32>,

    /// Space after the paragraph in points
    pub space_after_pts: Option<f32>,

    /// Line spacing multiplier (1.0 = single)
    pub line_spacing: Option<f32>,

    /// Widow/orphan control
    pub widow_control: Option<bool>,

    /// Keep lines together on one page
    pub keep_together: Option<bool>,

    /// Keep with the next paragraph
    pub keep_with_next: Option<bool>,

    /// Single black rule above the paragraph
    pub border_top: bool,

    /// Single black rule below the paragraph
    pub border_bottom: bool,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

impl Alignment {
    /// WordprocessingML `w:jc` value.
    pub fn as_wml(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }

    /// Parse a `w:jc` value; unknown values map to left.
    pub fn from_wml(val: &str) -> Self {
        match val {
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" | "distribute" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }
}

/// An atomic span of content with consistent character formatting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    /// Character formatting
    pub props: RunProps,

    /// Content pieces in order (text, drawings, field parts, breaks)
    pub content: Vec<RunContent>,
}

impl Run {
    /// Create a plain-text run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            props: RunProps::default(),
            content: vec![RunContent::Text(text.into())],
        }
    }

    /// Create a text run with explicit properties.
    pub fn styled(text: impl Into<String>, props: RunProps) -> Self {
        Self {
            props,
            content: vec![RunContent::Text(text.into())],
        }
    }

    /// Create a run holding a single drawing.
    pub fn drawing(drawing: Drawing) -> Self {
        Self {
            props: RunProps::default(),
            content: vec![RunContent::Drawing(drawing)],
        }
    }

    /// Create a run holding a page break.
    pub fn page_break() -> Self {
        Self {
            props: RunProps::default(),
            content: vec![RunContent::Break(BreakKind::Page)],
        }
    }

    /// Text content of this run (drawings, fields, and breaks contribute
    /// nothing).
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                RunContent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether the run carries a drawing.
    pub fn has_drawing(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, RunContent::Drawing(_)))
    }

    /// Replace the textual content with a single span, keeping
    /// everything else (drawings, fields) untouched.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content.retain(|c| !matches!(c, RunContent::Text(_)));
        self.content.insert(0, RunContent::Text(text.into()));
    }
}

/// Character formatting properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProps {
    /// Font family name
    pub font: Option<String>,

    /// Font size in points
    pub size_pts: Option<f32>,

    /// Bold
    pub bold: Option<bool>,

    /// Italic
    pub italic: Option<bool>,

    /// Underline
    pub underline: Option<bool>,

    /// Text color as RRGGBB hex
    pub color: Option<String>,
}

/// A piece of run content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunContent {
    /// A text span
    Text(String),

    /// An embedded drawing (inline image)
    Drawing(Drawing),

    /// A field character marker (`w:fldChar`)
    FieldChar(FieldCharKind),

    /// Field instruction text (`w:instrText`)
    InstrText(String),

    /// A line or page break
    Break(BreakKind),
}

/// Field character kind for complex fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCharKind {
    /// Field begin marker
    Begin,
    /// Separator between instruction and cached result
    Separate,
    /// Field end marker
    End,
}

impl FieldCharKind {
    /// WordprocessingML `w:fldCharType` value.
    pub fn as_wml(&self) -> &'static str {
        match self {
            FieldCharKind::Begin => "begin",
            FieldCharKind::Separate => "separate",
            FieldCharKind::End => "end",
        }
    }
}

/// Break kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    /// Line break
    Line,
    /// Page break
    Page,
}

/// Declared size of a drawing in EMU (914400 per inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    /// Width in EMU
    pub cx: i64,
    /// Height in EMU
    pub cy: i64,
}

/// An embedded drawing, kept as its raw `w:drawing` subtree plus the
/// parsed extent so it can be rescaled without interpreting DrawingML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drawing {
    /// Raw XML of the `w:drawing` element, written back verbatim
    pub xml: String,

    /// Declared extent (`wp:extent`), if present
    pub extent: Option<Extent>,
}

static EXTENT_CX: OnceLock<Regex> = OnceLock::new();
static EXTENT_CY: OnceLock<Regex> = OnceLock::new();

impl Drawing {
    /// Create a drawing from raw XML and a known extent.
    pub fn new(xml: impl Into<String>, extent: Option<Extent>) -> Self {
        Self {
            xml: xml.into(),
            extent,
        }
    }

    /// Scale every declared extent in the drawing subtree by `factor`,
    /// updating both the parsed extent and the raw markup.
    pub fn scale(&mut self, factor: f64) {
        if let Some(extent) = self.extent.as_mut() {
            extent.cx = (extent.cx as f64 * factor) as i64;
            extent.cy = (extent.cy as f64 * factor) as i64;
        }
        let cx = EXTENT_CX.get_or_init(|| Regex::new(r#"cx="(\d+)""#).unwrap());
        let cy = EXTENT_CY.get_or_init(|| Regex::new(r#"cy="(\d+)""#).unwrap());
        let scaled = cx.replace_all(&self.xml, |caps: &regex::Captures| {
            let v: i64 = caps[1].parse().unwrap_or(0);
            format!(r#"cx="{}""#, (v as f64 * factor) as i64)
        });
        let scaled = cy.replace_all(&scaled, |caps: &regex::Captures| {
            let v: i64 = caps[1].parse().unwrap_or(0);
            format!(r#"cy="{}""#, (v as f64 * factor) as i64)
        });
        self.xml = scaled.into_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_text() {
        let mut p = Paragraph::new();
        p.add_text("Hello ");
        p.add_run(Run::styled(
            "world",
            RunProps {
                bold: Some(true),
                ..Default::default()
            },
        ));
        assert_eq!(p.text(), "Hello world");
        assert!(!p.is_blank());
    }

    #[test]
    fn test_blank_paragraph() {
        assert!(Paragraph::new().is_blank());
        assert!(Paragraph::with_text("   ").is_blank());
    }

    #[test]
    fn test_all_text_runs_bold() {
        let mut p = Paragraph::new();
        assert!(!p.all_text_runs_bold());

        p.add_run(Run::styled(
            "Bold",
            RunProps {
                bold: Some(true),
                ..Default::default()
            },
        ));
        assert!(p.all_text_runs_bold());

        p.add_text("plain");
        assert!(!p.all_text_runs_bold());
    }

    #[test]
    fn test_run_text_skips_drawings() {
        let mut run = Run::new("caption");
        run.content.push(RunContent::Drawing(Drawing::new(
            "<w:drawing/>",
            None,
        )));
        assert_eq!(run.text(), "caption");
        assert!(run.has_drawing());
    }

    #[test]
    fn test_drawing_scale() {
        let xml = r#"<w:drawing><wp:inline><wp:extent cx="1000" cy="2000"/></wp:inline></w:drawing>"#;
        let mut drawing = Drawing::new(xml, Some(Extent { cx: 1000, cy: 2000 }));
        drawing.scale(0.85);
        assert_eq!(drawing.extent, Some(Extent { cx: 850, cy: 1700 }));
        assert!(drawing.xml.contains(r#"cx="850""#));
        assert!(drawing.xml.contains(r#"cy="1700""#));
    }

    #[test]
    fn test_alignment_wml_roundtrip() {
        assert_eq!(Alignment::Justify.as_wml(), "both");
        assert_eq!(Alignment::from_wml("both"), Alignment::Justify);
        assert_eq!(Alignment::from_wml("unknown"), Alignment::Left);
    }
}
