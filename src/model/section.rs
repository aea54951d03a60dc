//! Section types: page geometry, columns, numbering, header/footer slots.

use super::{Block, Relationship};
use serde::{Deserialize, Serialize};

/// A document section.
///
/// Owns page geometry, column configuration, numbering, and the
/// header/footer slots. The last section of a document is the
/// body-trailing one; earlier sections are anchored to the paragraph
/// carrying their break (`Paragraph::section_break`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Page size and margins
    pub page: PageGeometry,

    /// Column configuration
    pub columns: Columns,

    /// Section start type
    pub start: SectionStart,

    /// Distinct first-page header/footer (`w:titlePg`)
    pub title_page: bool,

    /// Distinct odd/even headers (`w:evenAndOddHeaders`)
    pub even_odd_headers: bool,

    /// Line numbering configuration, if enabled
    pub line_numbering: Option<LineNumbering>,

    /// Page numbering configuration, if explicit
    pub page_numbering: Option<PageNumbering>,

    /// First-page header slot
    pub header_first: HeaderFooterSlot,

    /// Default (odd-page) header slot
    pub header_default: HeaderFooterSlot,

    /// Even-page header slot
    pub header_even: HeaderFooterSlot,

    /// First-page footer slot
    pub footer_first: HeaderFooterSlot,

    /// Default footer slot
    pub footer_default: HeaderFooterSlot,
}

impl Section {
    /// Create a section with default (US Letter, one-inch margins,
    /// single column) geometry and all slots linked to the previous
    /// section.
    pub fn new() -> Self {
        Self {
            page: PageGeometry::letter(),
            columns: Columns::single(),
            start: SectionStart::NewPage,
            title_page: false,
            even_odd_headers: false,
            line_numbering: None,
            page_numbering: None,
            header_first: HeaderFooterSlot::Linked,
            header_default: HeaderFooterSlot::Linked,
            header_even: HeaderFooterSlot::Linked,
            footer_first: HeaderFooterSlot::Linked,
            footer_default: HeaderFooterSlot::Linked,
        }
    }

    /// Clear every header and footer slot to an explicit, unlinked,
    /// empty state.
    ///
    /// Editing a linked slot silently lands on an inherited ancestor
    /// section, so clearing must come before any injection.
    pub fn clear_header_footer_slots(&mut self) {
        self.header_first = HeaderFooterSlot::empty();
        self.header_default = HeaderFooterSlot::empty();
        self.header_even = HeaderFooterSlot::empty();
        self.footer_first = HeaderFooterSlot::empty();
        self.footer_default = HeaderFooterSlot::empty();
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}

/// Page size and margins, all in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width
    pub width_twips: i64,
    /// Page height
    pub height_twips: i64,
    /// Top margin
    pub margin_top_twips: i64,
    /// Bottom margin
    pub margin_bottom_twips: i64,
    /// Left margin
    pub margin_left_twips: i64,
    /// Right margin
    pub margin_right_twips: i64,
}

impl PageGeometry {
    /// US Letter with one-inch margins.
    pub fn letter() -> Self {
        Self {
            width_twips: 12240,
            height_twips: 15840,
            margin_top_twips: 1440,
            margin_bottom_twips: 1440,
            margin_left_twips: 1440,
            margin_right_twips: 1440,
        }
    }

    /// Width available to body content: page width minus left and right
    /// margins.
    pub fn usable_width_twips(&self) -> i64 {
        self.width_twips - self.margin_left_twips - self.margin_right_twips
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

/// Column configuration for a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Columns {
    /// Number of columns
    pub count: u16,
    /// Space between columns in twips
    pub space_twips: i64,
}

impl Columns {
    /// Single-column layout.
    pub fn single() -> Self {
        Self {
            count: 1,
            space_twips: 720,
        }
    }

    /// Multi-column layout with the given inter-column space.
    pub fn multi(count: u16, space_twips: i64) -> Self {
        Self { count, space_twips }
    }
}

impl Default for Columns {
    fn default() -> Self {
        Self::single()
    }
}

/// Section start type (`w:type`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStart {
    /// Continuous (no page break)
    Continuous,
    /// Start on a new page (default)
    #[default]
    NewPage,
    /// Start on the next even page
    EvenPage,
    /// Start on the next odd page
    OddPage,
}

impl SectionStart {
    /// WordprocessingML `w:type` value.
    pub fn as_wml(&self) -> &'static str {
        match self {
            SectionStart::Continuous => "continuous",
            SectionStart::NewPage => "nextPage",
            SectionStart::EvenPage => "evenPage",
            SectionStart::OddPage => "oddPage",
        }
    }

    /// Parse a `w:type` value; unknown values map to new-page.
    pub fn from_wml(val: &str) -> Self {
        match val {
            "continuous" => SectionStart::Continuous,
            "evenPage" => SectionStart::EvenPage,
            "oddPage" => SectionStart::OddPage,
            _ => SectionStart::NewPage,
        }
    }
}

/// Line numbering configuration (`w:lnNumType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineNumbering {
    /// Number every n-th line
    pub count_by: u32,
    /// Distance from the text in twips
    pub distance_twips: i64,
    /// Restart behavior
    pub restart: LineNumberRestart,
    /// First line number
    pub start: u32,
}

impl LineNumbering {
    /// Continuous numbering of every line at the given distance.
    pub fn continuous(distance_twips: i64) -> Self {
        Self {
            count_by: 1,
            distance_twips,
            restart: LineNumberRestart::Continuous,
            start: 1,
        }
    }
}

/// Line numbering restart behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineNumberRestart {
    /// Never restart
    Continuous,
    /// Restart on every page
    NewPage,
    /// Restart on every section
    NewSection,
}

impl LineNumberRestart {
    /// WordprocessingML `w:restart` value.
    pub fn as_wml(&self) -> &'static str {
        match self {
            LineNumberRestart::Continuous => "continuous",
            LineNumberRestart::NewPage => "newPage",
            LineNumberRestart::NewSection => "newSection",
        }
    }
}

/// Page numbering configuration (`w:pgNumType`).
///
/// `start: None` omits the explicit start value so numbering continues
/// from the previous section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNumbering {
    /// Explicit starting page number
    pub start: Option<u32>,
}

/// A header or footer slot on a section.
///
/// `Linked` inherits content from the previous section; injecting
/// content goes through [`HeaderFooterSlot::unlinked_mut`], which makes
/// the unlink explicit instead of silently editing an ancestor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum HeaderFooterSlot {
    /// Inherits from the previous section
    Linked,
    /// Explicit section-specific content
    Content(HeaderFooter),
}

impl HeaderFooterSlot {
    /// An explicit, empty, unlinked slot.
    pub fn empty() -> Self {
        HeaderFooterSlot::Content(HeaderFooter::new())
    }

    /// Whether the slot still inherits from the previous section.
    pub fn is_linked(&self) -> bool {
        matches!(self, HeaderFooterSlot::Linked)
    }

    /// Whether the slot has explicit content blocks.
    pub fn has_content(&self) -> bool {
        matches!(self, HeaderFooterSlot::Content(hf) if !hf.blocks.is_empty())
    }

    /// Unlink the slot (if needed) and return its content for editing.
    pub fn unlinked_mut(&mut self) -> &mut HeaderFooter {
        if self.is_linked() {
            *self = HeaderFooterSlot::empty();
        }
        match self {
            HeaderFooterSlot::Content(hf) => hf,
            HeaderFooterSlot::Linked => unreachable!("slot was just unlinked"),
        }
    }
}

impl Default for HeaderFooterSlot {
    fn default() -> Self {
        HeaderFooterSlot::Linked
    }
}

/// Header or footer content: a small block container plus the
/// relationships its part needs (masthead images).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderFooter {
    /// Paragraphs and tables in order
    pub blocks: Vec<Block>,

    /// Part-scoped relationships (image embeds)
    pub relationships: Vec<Relationship>,
}

impl HeaderFooter {
    /// Create empty header/footer content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Register a part-scoped relationship.
    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
    }
}
