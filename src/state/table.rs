/// Listing table loader
///
/// Reads a delimited MLS export (pipe, comma or tab separated) into memory.
/// The delimiter is sniffed from the first few KB of the file, blank rows
/// are dropped and the first remaining row becomes the schema.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::data::{Row, Schema};
use super::zip::ZipLookup;

/// Number of characters inspected when sniffing the delimiter
const SNIFF_SAMPLE_CHARS: usize = 4096;

/// Candidate delimiters, in tie-break order
const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b'\t', b'|'];

/// Used when sniffing cannot decide
const FALLBACK_DELIMITER: u8 = b'|';

/// Errors raised while loading a listing file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse listing file: {0}")]
    Csv(#[from] csv::Error),

    #[error("The selected file contains no readable rows.\nCheck delimiter and encoding.")]
    NoReadableRows,

    #[error("Missing required columns:\n{}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// In-memory listing table: schema plus rows
#[derive(Debug, Clone)]
pub struct ListingTable {
    schema: Schema,
    rows: Vec<Row>,
}

impl ListingTable {
    /// Load and validate a listing file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::parse(&String::from_utf8_lossy(&bytes))?;
        info!(
            "📁 Parsed {} listings ({} columns) from {}",
            table.rows.len(),
            table.schema.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse listing-file text
    pub fn parse(content: &str) -> Result<Self, LoadError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let delimiter = sniff_delimiter(content).unwrap_or_else(|| {
            debug!("Could not sniff delimiter, falling back to '|'");
            FALLBACK_DELIMITER
        });

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().any(|cell| !cell.trim().is_empty()) {
                records.push(record.iter().map(str::to_string).collect::<Row>());
            }
        }

        if records.len() < 2 {
            return Err(LoadError::NoReadableRows);
        }

        let mut records = records.into_iter();
        let header: Vec<String> = records
            .next()
            .map(|row| row.into_iter().map(|h| h.trim().to_string()).collect())
            .unwrap_or_default();
        let schema = Schema::from_header(header).map_err(LoadError::MissingColumns)?;

        let width = schema.len();
        let mut ragged = 0;
        let rows: Vec<Row> = records
            .map(|mut row| {
                if row.len() != width {
                    ragged += 1;
                    row.resize(width, String::new());
                }
                row
            })
            .collect();

        if ragged > 0 {
            warn!("⚠️  Normalised {} rows that did not match the header width", ragged);
        }

        Ok(Self { schema, rows })
    }

    /// Replace each row's `TOWN_NUM` cell with the town for its ZIP.
    ///
    /// Rows whose ZIP is unknown keep their original value. Does nothing
    /// when the file has no `TOWN_NUM` column. Returns the number of rows
    /// updated.
    pub fn resolve_towns(&mut self, lookup: &ZipLookup) -> usize {
        let Some(town) = self.schema.town else {
            return 0;
        };
        let zip = self.schema.zip;

        let mut resolved = 0;
        for row in &mut self.rows {
            if let Some(name) = lookup.town(&row[zip]) {
                row[town] = name.to_string();
                resolved += 1;
            }
        }
        resolved
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Trimmed listing identifier of a row (empty when absent)
    pub fn listing_id(&self, index: usize) -> &str {
        self.rows
            .get(index)
            .map(|row| row[self.schema.list_no].trim())
            .unwrap_or("")
    }

    /// Sorted distinct non-empty values of a column
    pub fn distinct_values(&self, column: usize) -> Vec<String> {
        let mut values: Vec<String> = self
            .rows
            .iter()
            .map(|row| row[column].clone())
            .filter(|value| !value.is_empty())
            .collect();
        values.sort();
        values.dedup();
        values
    }
}

/// Guess the delimiter of a delimited text sample.
///
/// A candidate wins when it appears the same, non-zero number of times on
/// the most lines of the sample. Ties go to the earlier entry of
/// [`CANDIDATE_DELIMITERS`]. Returns `None` when no candidate appears.
pub fn sniff_delimiter(content: &str) -> Option<u8> {
    let sample: String = content.chars().take(SNIFF_SAMPLE_CHARS).collect();
    let truncated = content.len() > sample.len();

    let mut lines: Vec<&str> = sample.lines().filter(|l| !l.trim().is_empty()).collect();
    // The last line of a truncated sample is probably incomplete
    if truncated && lines.len() > 1 {
        lines.pop();
    }
    if lines.is_empty() {
        return None;
    }

    let mut best: Option<(u8, usize)> = None;
    for &delimiter in &CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

        // Most common non-zero per-line count
        let mut frequencies: Vec<(usize, usize)> = Vec::new();
        for &count in counts.iter().filter(|&&c| c > 0) {
            match frequencies.iter_mut().find(|(c, _)| *c == count) {
                Some((_, n)) => *n += 1,
                None => frequencies.push((count, 1)),
            }
        }
        let Some(&(_, consistent)) = frequencies.iter().max_by_key(|(_, n)| *n) else {
            continue;
        };

        if best.map_or(true, |(_, score)| consistent > score) {
            best = Some((delimiter, consistent));
        }
    }

    best.map(|(delimiter, _)| delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPE_FILE: &str = "LIST_NO|ZIP|COUNTY|TOWN_NUM|NO_BEDROOMS\n\
                             7001|01701|Middlesex|123|3\n\
                             7002|02134|Suffolk|456|2\n";

    #[test]
    fn test_sniff_pipe() {
        assert_eq!(sniff_delimiter(PIPE_FILE), Some(b'|'));
    }

    #[test]
    fn test_sniff_comma_with_quoted_pipes() {
        let content = "LIST_NO,ZIP,COUNTY,REMARKS\n1,01701,Middlesex,\"a|b\"\n2,02134,Suffolk,plain\n";
        assert_eq!(sniff_delimiter(content), Some(b','));
    }

    #[test]
    fn test_sniff_tab() {
        let content = "LIST_NO\tZIP\tCOUNTY\n1\t01701\tMiddlesex\n";
        assert_eq!(sniff_delimiter(content), Some(b'\t'));
    }

    #[test]
    fn test_sniff_fails_without_candidates() {
        assert_eq!(sniff_delimiter("just words\nmore words\n"), None);
    }

    #[test]
    fn test_parse_pipe_file() {
        let table = ListingTable::parse(PIPE_FILE).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.schema().columns()[0], "LIST_NO");
        assert_eq!(table.rows()[1][2], "Suffolk");
        assert_eq!(table.listing_id(0), "7001");
    }

    #[test]
    fn test_parse_strips_bom_and_trims_header() {
        let content = "\u{feff} LIST_NO , ZIP ,COUNTY\n 7001 ,01701,Middlesex\n";
        let table = ListingTable::parse(content).unwrap();

        assert_eq!(table.schema().columns(), &["LIST_NO", "ZIP", "COUNTY"]);
        // Cells are kept verbatim, the identifier is trimmed
        assert_eq!(table.rows()[0][0], " 7001 ");
        assert_eq!(table.listing_id(0), "7001");
    }

    #[test]
    fn test_parse_discards_blank_rows() {
        let content = "\n|||\nLIST_NO|ZIP|COUNTY\n\n1|01701|Essex\n | | \n2|01970|Essex\n";
        let table = ListingTable::parse(content).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_parse_normalises_ragged_rows() {
        let content = "LIST_NO|ZIP|COUNTY\n1|01701\n2|01970|Essex|extra\n";
        let table = ListingTable::parse(content).unwrap();

        for row in table.rows() {
            assert_eq!(row.len(), table.schema().len());
        }
        assert_eq!(table.rows()[0][2], "");
        assert_eq!(table.rows()[1][2], "Essex");
    }

    #[test]
    fn test_header_only_is_unreadable() {
        let err = ListingTable::parse("LIST_NO|ZIP|COUNTY\n").unwrap_err();
        assert!(matches!(err, LoadError::NoReadableRows));

        let err = ListingTable::parse("").unwrap_err();
        assert!(matches!(err, LoadError::NoReadableRows));
    }

    #[test]
    fn test_missing_county_column() {
        let err = ListingTable::parse("LIST_NO|ZIP\n1|01701\n").unwrap_err();
        match err {
            LoadError::MissingColumns(missing) => assert_eq!(missing, vec!["COUNTY"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_towns() {
        let mut table = ListingTable::parse(PIPE_FILE).unwrap();
        let lookup = ZipLookup::parse("01701|Framingham\n");

        assert_eq!(table.resolve_towns(&lookup), 1);
        assert_eq!(table.rows()[0][3], "Framingham");
        // Unknown ZIP keeps its original value
        assert_eq!(table.rows()[1][3], "456");
    }

    #[test]
    fn test_resolve_towns_without_town_column() {
        let mut table = ListingTable::parse("LIST_NO|ZIP|COUNTY\n1|01701|Middlesex\n").unwrap();
        let lookup = ZipLookup::parse("01701|Framingham\n");

        assert_eq!(table.resolve_towns(&lookup), 0);
        assert_eq!(table.rows()[0], vec!["1", "01701", "Middlesex"]);
    }

    #[test]
    fn test_distinct_values() {
        let content = "LIST_NO|ZIP|COUNTY\n1|a|Suffolk\n2|b|\n3|c|Essex\n4|d|Suffolk\n";
        let table = ListingTable::parse(content).unwrap();

        assert_eq!(table.distinct_values(table.schema().county), vec!["Essex", "Suffolk"]);
    }

    #[test]
    fn test_load_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.txt");
        let mut bytes = b"LIST_NO|ZIP|COUNTY|REMARKS\n7001|01701|Middlesex|sunny ".to_vec();
        bytes.extend_from_slice(b"\xff deck\n");
        std::fs::write(&path, bytes).unwrap();

        let table = ListingTable::load(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0][3], "sunny \u{fffd} deck");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ListingTable::load(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
