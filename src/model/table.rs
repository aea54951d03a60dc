//! Table types.

use super::{Alignment, Block, Paragraph};
use serde::{Deserialize, Serialize};

/// A table embedded in the document body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Column widths in twips (`w:tblGrid`)
    pub grid: Vec<i64>,

    /// Preferred table width in twips (`w:tblW` with dxa units)
    pub width_twips: Option<i64>,

    /// Whether the layout engine may autofit column widths
    pub autofit: bool,

    /// Table alignment
    pub alignment: Alignment,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            autofit: true,
            ..Self::default()
        }
    }

    /// Create a table from a grid of cell texts, with equal column
    /// widths taken from `grid`.
    pub fn from_texts(rows: &[&[&str]], grid: Vec<i64>) -> Self {
        let mut table = Self::new();
        table.grid = grid;
        for row in rows {
            table.rows.push(TableRow::from_strings(row.iter().copied()));
        }
        table
    }

    /// Add a row.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (from the grid, falling back to the first row).
    pub fn column_count(&self) -> usize {
        if !self.grid.is_empty() {
            self.grid.len()
        } else {
            self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
        }
    }

    /// Sum of current grid column widths.
    pub fn total_grid_width(&self) -> i64 {
        self.grid.iter().sum()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a row with the given cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Create a row of plain-text cells.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }
}

/// A table cell: a width plus a block container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    /// Explicit cell width in twips (`w:tcW`)
    pub width_twips: Option<i64>,

    /// Cell content blocks
    pub blocks: Vec<Block>,
}

impl TableCell {
    /// Create a cell with a single text paragraph.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            width_twips: None,
            blocks: vec![Block::Paragraph(Paragraph::with_text(text))],
        }
    }

    /// Create an empty cell holding one blank paragraph.
    ///
    /// WordprocessingML requires at least one paragraph per cell.
    pub fn empty() -> Self {
        Self {
            width_twips: None,
            blocks: vec![Block::Paragraph(Paragraph::new())],
        }
    }

    /// Create a cell around an existing paragraph.
    pub fn with_paragraph(paragraph: Paragraph) -> Self {
        Self {
            width_twips: None,
            blocks: vec![Block::Paragraph(paragraph)],
        }
    }

    /// Set the explicit width and return self.
    pub fn width(mut self, twips: i64) -> Self {
        self.width_twips = Some(twips);
        self
    }

    /// Plain text content of the cell.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.text()),
                Block::Table(_) => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// First paragraph of the cell, if any.
    pub fn first_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        self.blocks.iter_mut().find_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }
}
