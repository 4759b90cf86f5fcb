/// State management module
///
/// This module handles all listing data, including:
/// - Loading delimited listing files (table.rs)
/// - Schema and shared column names (data.rs)
/// - ZIP → town resolution (zip.rs)
/// - Loose numeric parsing of fields (numeric.rs)
/// - Filtering and sorting the displayed rows (filter.rs, sort.rs)
/// - The per-session state object tying these together (session.rs)

pub mod data;
pub mod filter;
pub mod numeric;
pub mod session;
pub mod sort;
pub mod table;
pub mod zip;
