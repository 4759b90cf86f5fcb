/// ZIP code to town name lookup
///
/// The reference file ships next to the executable as `zipcode.txt`,
/// one record per line: `ZIP|TOWN_NAME|...`. Only the first two fields
/// are used. The table is loaded once at startup and never changes.
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while reading the ZIP reference file
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{} not found.", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read-only ZIP → town mapping
#[derive(Debug, Clone, Default)]
pub struct ZipLookup {
    towns: HashMap<String, String>,
}

impl ZipLookup {
    /// Load the lookup from a pipe-delimited reference file.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Lines with fewer
    /// than two fields are skipped. A repeated ZIP keeps the last town seen.
    pub fn load(path: &Path) -> Result<Self, LookupError> {
        let bytes = fs::read(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LookupError::NotFound(path.to_path_buf())
            } else {
                LookupError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let lookup = Self::parse(&String::from_utf8_lossy(&bytes));
        if lookup.is_empty() {
            warn!("⚠️  No ZIP codes in {}; towns will not be resolved", path.display());
        } else {
            info!("🗺️  Loaded {} ZIP codes from {}", lookup.len(), path.display());
        }
        Ok(lookup)
    }

    /// Build a lookup from reference-file text
    pub fn parse(content: &str) -> Self {
        let towns = content
            .lines()
            .filter_map(|line| {
                let mut parts = line.trim().split('|');
                let zip = parts.next()?;
                let town = parts.next()?;
                Some((zip.to_string(), town.to_string()))
            })
            .collect();

        Self { towns }
    }

    /// Town name for a ZIP code, if known
    pub fn town(&self, zip: &str) -> Option<&str> {
        self.towns.get(zip).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.towns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towns.is_empty()
    }
}
