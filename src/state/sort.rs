/// Column sorting for the results table
///
/// Each column keeps its own ascending/descending toggle for the whole
/// session. Cells that parse as numbers sort numerically, everything else
/// sorts as lowercase text.
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

use super::table::ListingTable;

/// Comparable form of a cell
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn from_cell(cell: &str) -> Self {
        match cell.trim().parse::<f64>() {
            Ok(n) => SortKey::Number(n),
            Err(_) => SortKey::Text(cell.to_lowercase()),
        }
    }

    /// Numbers order before text in mixed columns
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

/// Sort direction applied by the last click on a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Per-column toggle state
#[derive(Debug, Clone, Default)]
pub struct SortState {
    /// Column name → whether the next sort is descending
    next_descending: HashMap<String, bool>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reorder the displayed rows by a column, flipping that column's toggle.
    ///
    /// The first sort of a column is ascending. Equal keys keep their
    /// current relative order. Returns `None` (and leaves the rows alone)
    /// when the column is not in the table.
    pub fn sort(
        &mut self,
        table: &ListingTable,
        rows: &mut [usize],
        column: &str,
    ) -> Option<Direction> {
        let Some(col) = table.schema().position(column) else {
            warn!("⚠️  Cannot sort by unknown column {}", column);
            return None;
        };

        let descending = self.next_descending.entry(column.to_string()).or_insert(false);
        let direction = if *descending {
            Direction::Descending
        } else {
            Direction::Ascending
        };
        *descending = !*descending;

        let mut keyed: Vec<(SortKey, usize)> = rows
            .iter()
            .map(|&i| (SortKey::from_cell(&table.rows()[i][col]), i))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| match direction {
            Direction::Ascending => a.compare(b),
            Direction::Descending => b.compare(a),
        });

        for (slot, (_, index)) in rows.iter_mut().zip(keyed) {
            *slot = index;
        }

        Some(direction)
    }
}
