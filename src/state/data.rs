/// Shared data structures for the listing table
///
/// These structs represent the data model that flows between
/// the file loader, the filter/sort engines and the UI layer.
use std::collections::HashMap;

/// Listing identifier column (MLS number)
pub const LIST_NO: &str = "LIST_NO";
pub const ZIP: &str = "ZIP";
pub const COUNTY: &str = "COUNTY";
pub const TOWN_NUM: &str = "TOWN_NUM";
pub const NO_BEDROOMS: &str = "NO_BEDROOMS";
pub const NO_BATHS: &str = "NO_BATHS";
pub const LIST_PRICE: &str = "LIST_PRICE";
pub const SQUARE_FEET: &str = "SQUARE_FEET";
pub const REMARKS: &str = "REMARKS";
/// Never displayed; the table gets its own photo column instead
pub const PHOTO: &str = "PHOTO";

/// Columns every listing file must carry
pub const REQUIRED_COLUMNS: [&str; 3] = [LIST_NO, ZIP, COUNTY];

/// One listing: cells positionally aligned with the [`Schema`]
pub type Row = Vec<String>;

/// Ordered column names plus the positions of the columns the
/// application cares about, resolved once when a file is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
    /// Position of `LIST_NO`
    pub list_no: usize,
    /// Position of `ZIP`
    pub zip: usize,
    /// Position of `COUNTY`
    pub county: usize,
    pub town: Option<usize>,
    pub bedrooms: Option<usize>,
    pub baths: Option<usize>,
    pub price: Option<usize>,
    pub square_feet: Option<usize>,
    pub remarks: Option<usize>,
}

impl Schema {
    /// Build a schema from a header row.
    ///
    /// Returns the names of any missing required columns as the error.
    /// Duplicate names resolve to their first occurrence.
    pub fn from_header(header: Vec<String>) -> Result<Self, Vec<String>> {
        let mut positions = HashMap::new();
        for (i, name) in header.iter().enumerate() {
            positions.entry(name.clone()).or_insert(i);
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !positions.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        let find = |name: &str| positions.get(name).copied();

        Ok(Schema {
            list_no: positions[LIST_NO],
            zip: positions[ZIP],
            county: positions[COUNTY],
            town: find(TOWN_NUM),
            bedrooms: find(NO_BEDROOMS),
            baths: find(NO_BATHS),
            price: find(LIST_PRICE),
            square_feet: find(SQUARE_FEET),
            remarks: find(REMARKS),
            columns: header,
            positions,
        })
    }

    /// All column names, in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Positions of the columns shown to the user (everything but `PHOTO`)
    pub fn visible(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() != PHOTO)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolves_positions() {
        let schema =
            Schema::from_header(header(&["LIST_NO", "PHOTO", "ZIP", "COUNTY", "TOWN_NUM"])).unwrap();

        assert_eq!(schema.len(), 5);
        assert_eq!(schema.list_no, 0);
        assert_eq!(schema.zip, 2);
        assert_eq!(schema.county, 3);
        assert_eq!(schema.town, Some(4));
        assert_eq!(schema.bedrooms, None);
        assert_eq!(schema.visible(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_missing_required_columns() {
        let missing = Schema::from_header(header(&["LIST_NO", "TOWN_NUM"])).unwrap_err();
        assert_eq!(missing, vec!["ZIP".to_string(), "COUNTY".to_string()]);
    }

    #[test]
    fn test_duplicate_columns_use_first() {
        let schema = Schema::from_header(header(&["LIST_NO", "ZIP", "COUNTY", "ZIP"])).unwrap();
        assert_eq!(schema.zip, 1);
        assert_eq!(schema.position("ZIP"), Some(1));
    }
}
