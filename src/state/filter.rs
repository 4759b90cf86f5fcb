/// Filter engine
///
/// Evaluates the filter panel's criteria against the listing table.
/// Every keystroke re-runs a full linear scan; the result is a list of
/// row indices in original table order.
use thiserror::Error;
use tracing::warn;

use super::data::{self, Row, Schema};
use super::numeric::parse_number;
use super::table::ListingTable;

/// A predicate could not be evaluated for a row
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("column {0} is not present in the loaded file")]
    MissingColumn(&'static str),
}

/// Snapshot of the filter inputs, exactly as typed.
///
/// Empty fields are not applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub county: String,
    pub town: String,
    pub min_beds: String,
    pub min_baths: String,
    pub min_price: String,
    pub max_price: String,
    pub min_sqft: String,
    pub remarks: String,
}

/// Criteria with numeric bounds parsed once per scan
#[derive(Debug)]
struct Predicates<'a> {
    county: Option<&'a str>,
    town: Option<&'a str>,
    min_beds: Option<f64>,
    min_baths: Option<f64>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    min_sqft: Option<f64>,
    remarks: Option<String>,
}

impl<'a> Predicates<'a> {
    fn compile(criteria: &'a FilterCriteria) -> Self {
        let text = |value: &'a str| (!value.is_empty()).then_some(value);

        Self {
            county: text(criteria.county.as_str()),
            town: text(criteria.town.as_str()),
            min_beds: parse_number(&criteria.min_beds),
            min_baths: parse_number(&criteria.min_baths),
            min_price: parse_number(&criteria.min_price),
            max_price: parse_number(&criteria.max_price),
            min_sqft: parse_number(&criteria.min_sqft),
            remarks: text(criteria.remarks.as_str()).map(str::to_lowercase),
        }
    }

    fn matches(&self, schema: &Schema, row: &Row) -> Result<bool, FilterError> {
        if let Some(county) = self.county {
            if row[schema.county] != county {
                return Ok(false);
            }
        }

        // Files without a town column are never filtered by town
        if let (Some(town), Some(col)) = (self.town, schema.town) {
            if row[col] != town {
                return Ok(false);
            }
        }

        let value = |col: Option<usize>, name: &'static str| -> Result<f64, FilterError> {
            let col = col.ok_or(FilterError::MissingColumn(name))?;
            Ok(parse_number(&row[col]).unwrap_or(0.0))
        };

        if let Some(min) = self.min_beds {
            if value(schema.bedrooms, data::NO_BEDROOMS)? < min {
                return Ok(false);
            }
        }
        if let Some(min) = self.min_baths {
            if value(schema.baths, data::NO_BATHS)? < min {
                return Ok(false);
            }
        }
        if let Some(min) = self.min_price {
            if value(schema.price, data::LIST_PRICE)? < min {
                return Ok(false);
            }
        }
        if let Some(max) = self.max_price {
            if value(schema.price, data::LIST_PRICE)? > max {
                return Ok(false);
            }
        }
        if let Some(min) = self.min_sqft {
            if value(schema.square_feet, data::SQUARE_FEET)? < min {
                return Ok(false);
            }
        }

        if let (Some(needle), Some(col)) = (&self.remarks, schema.remarks) {
            if !row[col].to_lowercase().contains(needle.as_str()) {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Run the criteria over the whole table.
///
/// Rows whose predicates fail to evaluate are dropped from the result and
/// logged; the scan always completes.
pub fn filter_rows(table: &ListingTable, criteria: &FilterCriteria) -> Vec<usize> {
    let predicates = Predicates::compile(criteria);
    let schema = table.schema();

    let mut matched = Vec::new();
    let mut failures = 0usize;
    let mut first_failure = None;

    for (index, row) in table.rows().iter().enumerate() {
        match predicates.matches(schema, row) {
            Ok(true) => matched.push(index),
            Ok(false) => {}
            Err(e) => {
                failures += 1;
                first_failure.get_or_insert((index, e));
            }
        }
    }

    if let Some((index, e)) = first_failure {
        warn!("⚠️  Filter error on {} rows (first at row {}): {}", failures, index, e);
    }

    matched
}
