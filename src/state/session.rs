use std::path::Path;
use tracing::info;

use super::filter::{filter_rows, FilterCriteria};
use super::sort::{Direction, SortState};
use super::table::{ListingTable, LoadError};
use super::zip::ZipLookup;

/// What a successful load produced, for the status line and dropdowns
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub rows: usize,
    pub towns_resolved: usize,
    /// Distinct non-empty counties, sorted
    pub counties: Vec<String>,
    /// Distinct non-empty towns, sorted (empty without a `TOWN_NUM` column)
    pub towns: Vec<String>,
}

/// Everything the application knows about the current session:
/// the ZIP lookup, the loaded listing table and the sort toggles.
///
/// The table is replaced wholesale by each successful load and dropped
/// with the session.
#[derive(Debug, Default)]
pub struct Session {
    zips: ZipLookup,
    table: Option<ListingTable>,
    sort: SortState,
}

impl Session {
    pub fn new(zips: ZipLookup) -> Self {
        Self {
            zips,
            table: None,
            sort: SortState::new(),
        }
    }

    /// Load a listing file, replacing the current table only on success
    pub fn load_file(&mut self, path: &Path) -> Result<LoadSummary, LoadError> {
        let table = ListingTable::load(path)?;
        Ok(self.replace_table(table))
    }

    /// Install a freshly parsed table and resolve its towns
    pub fn replace_table(&mut self, mut table: ListingTable) -> LoadSummary {
        let towns_resolved = table.resolve_towns(&self.zips);

        let schema = table.schema();
        let summary = LoadSummary {
            rows: table.len(),
            towns_resolved,
            counties: table.distinct_values(schema.county),
            towns: schema
                .town
                .map(|col| table.distinct_values(col))
                .unwrap_or_default(),
        };

        info!(
            "📁 Loaded {} rows ({} towns resolved from ZIP)",
            summary.rows, summary.towns_resolved
        );
        self.table = Some(table);
        summary
    }

    pub fn table(&self) -> Option<&ListingTable> {
        self.table.as_ref()
    }

    /// Rows matching the criteria, or nothing when no file is loaded
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<usize> {
        self.table
            .as_ref()
            .map(|table| filter_rows(table, criteria))
            .unwrap_or_default()
    }

    /// Sort the displayed rows by a column (see [`SortState::sort`])
    pub fn sort(&mut self, rows: &mut [usize], column: &str) -> Option<Direction> {
        let table = self.table.as_ref()?;
        self.sort.sort(table, rows, column)
    }
}
