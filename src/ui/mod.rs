/// View builders for the main window
///
/// - Filter panel (filters.rs)
/// - Results table with thumbnails (table.rs)
/// - Listing detail view with photo gallery (detail.rs)

pub mod detail;
pub mod filters;
pub mod table;
