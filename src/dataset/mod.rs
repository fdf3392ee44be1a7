/// Read-only nutrition reference dataset.
///
/// Matching only ever asks three questions of the dataset: is there a food
/// with exactly this name, is there one whose name contains this text, and
/// which foods contain all of these texts. Name comparison ignores ASCII
/// case; results come back in dataset insertion order.
pub mod memory;

use thiserror::Error;

use crate::db::models::NutritionRecord;

/// Errors raised by the dataset store itself. An empty result is never an
/// error.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("dataset query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Name lookups over the nutrition dataset.
///
/// A SQLite connection is not `Sync`; callers sharing a [`crate::db::Db`]
/// across threads wrap it in a mutex.
pub trait NutritionLookup {
    /// First food whose name equals `name`.
    fn find_exact(&self, name: &str) -> Result<Option<NutritionRecord>, DatasetError>;

    /// First food whose name contains `fragment`.
    fn find_containing(&self, fragment: &str) -> Result<Option<NutritionRecord>, DatasetError>;

    /// Up to `limit` foods whose names contain every one of `fragments`.
    fn find_containing_all(
        &self,
        fragments: &[String],
        limit: usize,
    ) -> Result<Vec<NutritionRecord>, DatasetError>;
}
