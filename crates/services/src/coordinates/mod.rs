//! Recognizers for coordinate notations written directly in text.

mod grid;
mod maidenhead;
mod utm;
mod wgs84;

pub use grid::{Grid, GridSystem};
pub use maidenhead::Maidenhead;
pub use utm::UtmService;
pub use wgs84::Wgs84;

use regex::Regex;

/// A free-text pattern and its whole-input twin.
#[derive(Debug)]
pub(crate) struct Patterns {
    pub find: Regex,
    pub anchored: Regex,
}

impl Patterns {
    /// Compiles `body` unanchored and anchored. Only called on patterns
    /// assembled from literals.
    pub fn new(body: &str) -> Self {
        Self {
            find: Regex::new(body).unwrap(),
            anchored: Regex::new(&format!("^(?:{body})$")).unwrap(),
        }
    }
}
