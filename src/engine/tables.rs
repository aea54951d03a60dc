//! Table normalization: rescale every table to the usable page width.

use crate::model::{Alignment, Document};

/// Rescale all body tables to `usable_width_twips`.
///
/// The outer width is always set (with autofit disabled and left
/// alignment forced); column widths are rescaled proportionally so the
/// original ratios survive, with the rounding remainder folded into the
/// last column so the widths sum exactly to the target. A grid whose
/// current widths sum to zero is left unscaled.
pub fn normalize_tables(document: &mut Document, usable_width_twips: i64) {
    for table in document.tables_mut() {
        table.width_twips = Some(usable_width_twips);
        table.autofit = false;
        table.alignment = Alignment::Left;

        let total = table.total_grid_width();
        if total <= 0 {
            continue;
        }

        let mut assigned = 0i64;
        let count = table.grid.len();
        for (i, width) in table.grid.iter_mut().enumerate() {
            let new_width = if i + 1 == count {
                usable_width_twips - assigned
            } else {
                usable_width_twips * *width / total
            };
            assigned += new_width;
            *width = new_width;
        }

        for row in &mut table.rows {
            for cell in &mut row.cells {
                if let Some(width) = cell.width_twips.as_mut() {
                    *width = usable_width_twips * *width / total;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;

    #[test]
    fn test_proportional_rescale() {
        let mut doc = Document::new();
        doc.push_table(Table::from_texts(
            &[&["a", "b", "c"]],
            vec![2, 3, 5],
        ));

        let target = 10_000;
        normalize_tables(&mut doc, target);

        let table = doc.tables().next().unwrap();
        assert_eq!(table.width_twips, Some(target));
        assert!(!table.autofit);
        assert_eq!(table.alignment, Alignment::Left);

        // Ratios preserved within rounding, sum exact.
        assert_eq!(table.grid, vec![2_000, 3_000, 5_000]);
        assert_eq!(table.total_grid_width(), target);
    }

    #[test]
    fn test_rounding_remainder_lands_in_last_column() {
        let mut doc = Document::new();
        doc.push_table(Table::from_texts(&[&["a", "b", "c"]], vec![1, 1, 1]));
        normalize_tables(&mut doc, 10_000);

        let table = doc.tables().next().unwrap();
        assert_eq!(table.total_grid_width(), 10_000);
        assert_eq!(table.grid[0], 3_333);
        assert_eq!(table.grid[1], 3_333);
        assert_eq!(table.grid[2], 3_334);
    }

    #[test]
    fn test_zero_width_grid_skips_rescale() {
        let mut doc = Document::new();
        doc.push_table(Table::from_texts(&[&["a", "b"]], vec![0, 0]));
        normalize_tables(&mut doc, 9_000);

        let table = doc.tables().next().unwrap();
        // Outer width is still set; the grid stays as-is.
        assert_eq!(table.width_twips, Some(9_000));
        assert_eq!(table.grid, vec![0, 0]);
    }

    #[test]
    fn test_cell_widths_follow_columns() {
        let mut doc = Document::new();
        let mut table = Table::from_texts(&[&["a", "b"]], vec![500, 500]);
        for cell in &mut table.rows[0].cells {
            cell.width_twips = Some(500);
        }
        doc.push_table(table);
        normalize_tables(&mut doc, 2_000);

        let table = doc.tables().next().unwrap();
        for cell in &table.rows[0].cells {
            assert_eq!(cell.width_twips, Some(1_000));
        }
    }
}
