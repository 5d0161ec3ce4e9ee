// src/extractors/mod.rs
pub mod classifier;
pub mod context;
pub mod metadata;
pub mod pivot;
pub mod register;
pub mod section;
pub mod workload;

// Re-export key extraction types for convenience
pub use classifier::BlankRowMode;
pub use context::{KeyPolicy, DEFAULT_LOCATION_TOKEN};
pub use pivot::{ExtractedTable, PivotExtractor, PivotTableSpec, TableValue, ValueRule};
pub use section::{ExtractedSections, LeadingRows, SectionExtractor, SectionLayout};

/// Result of a pass that found its structure: either rows were produced or
/// none qualified.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Data(T),
    NoData,
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Data(value) => Outcome::Data(f(value)),
            Outcome::NoData => Outcome::NoData,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Data(value) => Some(value),
            Outcome::NoData => None,
        }
    }
}
