//! The set of locations polled on every run.

use serde::Deserialize;
use thiserror::Error;

const BUILTIN_LOCATIONS: &str = include_str!("../../config/locations.toml");

#[derive(Deserialize)]
struct LocationFile {
    locations: Vec<String>,
}

/// Built-in location identifiers, read from the embedded data file.
pub fn builtin_locations() -> Result<Vec<String>, LocationError> {
    toml::from_str::<LocationFile>(BUILTIN_LOCATIONS)
        .map(|file| file.locations)
        .map_err(|e| LocationError::Builtin(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("no locations configured")]
    Empty,

    #[error("duplicate location '{0}'")]
    Duplicate(String),

    #[error("'{0}' is not a valid location identifier")]
    Invalid(String),

    #[error("built-in location list is unreadable: {0}")]
    Builtin(String),
}

/// Ordered, duplicate-free list of location identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSet {
    ids: Vec<String>,
}

impl LocationSet {
    pub fn new(ids: Vec<String>) -> Result<Self, LocationError> {
        if ids.is_empty() {
            return Err(LocationError::Empty);
        }
        for (i, id) in ids.iter().enumerate() {
            if !is_valid_id(id) {
                return Err(LocationError::Invalid(id.clone()));
            }
            if ids[..i].contains(id) {
                return Err(LocationError::Duplicate(id.clone()));
            }
        }
        Ok(Self { ids })
    }

    pub fn builtin() -> Result<Self, LocationError> {
        Self::new(builtin_locations()?)
    }

    /// The configured list, or the built-in one when none is configured.
    pub fn resolve(configured: &[String]) -> Result<Self, LocationError> {
        if configured.is_empty() {
            Self::builtin()
        } else {
            Self::new(configured.to_vec())
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|l| l == id)
    }
}

// Identifiers are interpolated into a URL path, so keep them to one plain segment.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
