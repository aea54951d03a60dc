//! Document-level types.

use super::{Paragraph, Section, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed DOCX document: the editable tree the engine mutates in
/// place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (docProps/core.xml)
    pub metadata: Metadata,

    /// Body blocks (paragraphs and tables) in order
    pub body: Vec<Block>,

    /// Sections; the last one is the body-trailing section, earlier
    /// ones are anchored via `Paragraph::section_break`
    pub sections: Vec<Section>,

    /// Raw styles part, carried through unchanged
    pub styles_xml: Option<String>,

    /// Raw numbering part, carried through unchanged
    pub numbering_xml: Option<String>,

    /// Relationships of the main document part
    pub relationships: Vec<Relationship>,

    /// Binary media parts (word/media/*)
    pub media: Vec<MediaPart>,
}

impl Document {
    /// Create a new empty document with a single default section.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            body: Vec::new(),
            sections: vec![Section::new()],
            styles_xml: None,
            numbering_xml: None,
            relationships: Vec::new(),
            media: Vec::new(),
        }
    }

    /// Build a document from plain paragraph texts (used heavily in
    /// tests).
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        let mut doc = Self::new();
        for text in texts {
            doc.push_paragraph(Paragraph::with_text(text));
        }
        doc
    }

    /// Whether the body has no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Number of body paragraphs (tables excluded).
    pub fn paragraph_count(&self) -> usize {
        self.body
            .iter()
            .filter(|b| matches!(b, Block::Paragraph(_)))
            .count()
    }

    /// Iterate body paragraphs in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// Iterate body paragraphs mutably.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.body.iter_mut().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// Get the n-th paragraph (paragraph index space, tables skipped).
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs().nth(index)
    }

    /// Get the n-th paragraph mutably.
    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.paragraphs_mut().nth(index)
    }

    /// Map a paragraph index to its position in `body`.
    pub fn block_index_of_paragraph(&self, index: usize) -> Option<usize> {
        self.body
            .iter()
            .enumerate()
            .filter(|(_, b)| matches!(b, Block::Paragraph(_)))
            .nth(index)
            .map(|(block_index, _)| block_index)
    }

    /// Insert a paragraph before the paragraph at `index` using a
    /// sibling-level tree edit; unrelated blocks are untouched. An
    /// `index` at or past the end appends.
    pub fn insert_paragraph_before(&mut self, index: usize, paragraph: Paragraph) {
        match self.block_index_of_paragraph(index) {
            Some(block_index) => self.body.insert(block_index, Block::Paragraph(paragraph)),
            None => self.body.push(Block::Paragraph(paragraph)),
        }
    }

    /// Insert a paragraph immediately after the paragraph at `index`.
    pub fn insert_paragraph_after(&mut self, index: usize, paragraph: Paragraph) {
        match self.block_index_of_paragraph(index) {
            Some(block_index) => self
                .body
                .insert(block_index + 1, Block::Paragraph(paragraph)),
            None => self.body.push(Block::Paragraph(paragraph)),
        }
    }

    /// Append a paragraph to the body.
    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    /// Append a table to the body.
    pub fn push_table(&mut self, table: Table) {
        self.body.push(Block::Table(table));
    }

    /// Iterate body tables mutably.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.body.iter_mut().filter_map(|b| match b {
            Block::Paragraph(_) => None,
            Block::Table(t) => Some(t),
        })
    }

    /// Iterate body tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|b| match b {
            Block::Paragraph(_) => None,
            Block::Table(t) => Some(t),
        })
    }

    /// Defensive repair for structurally empty input: guarantee at
    /// least one paragraph and one section.
    pub fn ensure_non_empty(&mut self) {
        if self.paragraph_count() == 0 {
            self.push_paragraph(Paragraph::new());
        }
        if self.sections.is_empty() {
            self.sections.push(Section::new());
        }
    }

    /// Plain text of all body paragraphs, one line each.
    pub fn plain_text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Look up a relationship by id.
    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    /// Next unused relationship id of the form `rIdN`.
    pub fn next_relationship_id(&self) -> String {
        let max = self
            .relationships
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A body-level block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
}

/// Document metadata from docProps/core.xml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document creator
    pub creator: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

/// A package relationship (word/_rels/document.xml.rels entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship id (e.g. "rId4")
    pub id: String,

    /// Relationship type URI
    pub rel_type: String,

    /// Target part, relative to the source part
    pub target: String,

    /// Whether the target is external (hyperlinks)
    pub external: bool,
}

/// A binary part carried through the package (images, etc.).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaPart {
    /// Part name relative to the package root (e.g. "word/media/image1.png")
    pub name: String,

    /// Raw bytes
    pub data: Vec<u8>,
}
