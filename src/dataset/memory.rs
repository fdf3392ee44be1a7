/// In-memory nutrition dataset.
///
/// Same lookup semantics as the SQLite store, without a database. Handy for
/// tests and for callers that ship a small fixed dataset.
use super::{DatasetError, NutritionLookup};
use crate::db::models::NutritionRecord;

#[derive(Debug, Default, Clone)]
pub struct MemoryDataset {
    records: Vec<NutritionRecord>,
}

impl MemoryDataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset of bare records from names, in order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut dataset = Self::new();
        for name in names {
            dataset.insert(NutritionRecord::named(name.as_ref()));
        }
        dataset
    }

    /// Append a record. Returns `false` if the name is already present.
    pub fn insert(&mut self, record: NutritionRecord) -> bool {
        if self.records.iter().any(|r| r.food_name == record.food_name) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn contains_fold(name: &str, fragment: &str) -> bool {
    name.to_ascii_lowercase()
        .contains(&fragment.to_ascii_lowercase())
}

impl NutritionLookup for MemoryDataset {
    fn find_exact(&self, name: &str) -> Result<Option<NutritionRecord>, DatasetError> {
        Ok(self
            .records
            .iter()
            .find(|r| r.food_name.eq_ignore_ascii_case(name))
            .cloned())
    }

    fn find_containing(&self, fragment: &str) -> Result<Option<NutritionRecord>, DatasetError> {
        Ok(self
            .records
            .iter()
            .find(|r| contains_fold(&r.food_name, fragment))
            .cloned())
    }

    fn find_containing_all(
        &self,
        fragments: &[String],
        limit: usize,
    ) -> Result<Vec<NutritionRecord>, DatasetError> {
        if fragments.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .records
            .iter()
            .filter(|r| fragments.iter().all(|f| contains_fold(&r.food_name, f)))
            .take(limit)
            .cloned()
            .collect())
    }
}
