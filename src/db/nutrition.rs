use super::{Db, models::NutritionRecord};
use crate::dataset::{DatasetError, NutritionLookup};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Result, params};

const SELECT_COLUMNS: &str = r#"
    SELECT food_name, serving_size_grams, calories, protein, fat, carbs,
           sugars, sodium, cholesterol, trans_fat
    FROM nutrition_data
"#;

fn map_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NutritionRecord> {
    Ok(NutritionRecord {
        food_name: row.get(0)?,
        serving_size_grams: row.get(1)?,
        calories: row.get(2)?,
        protein: row.get(3)?,
        fat: row.get(4)?,
        carbs: row.get(5)?,
        sugars: row.get(6)?,
        sodium: row.get(7)?,
        cholesterol: row.get(8)?,
        trans_fat: row.get(9)?,
    })
}

impl Db {
    /// Inserts a record unless its name is already present. Returns whether a row was added.
    pub fn insert_nutrition(&self, record: &NutritionRecord) -> Result<bool> {
        let rows = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO nutrition_data
                (food_name, serving_size_grams, calories, protein, fat, carbs,
                 sugars, sodium, cholesterol, trans_fat)
            VALUES (?, COALESCE(?, 100.0), ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                record.food_name,
                record.serving_size_grams,
                record.calories,
                record.protein,
                record.fat,
                record.carbs,
                record.sugars,
                record.sodium,
                record.cholesterol,
                record.trans_fat,
            ],
        )?;
        Ok(rows > 0)
    }

    /// Number of foods in the dataset
    pub fn count_nutrition(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT count(*) FROM nutrition_data", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn nutrition_by_name(&self, name: &str) -> Result<Option<NutritionRecord>> {
        let query =
            format!("{SELECT_COLUMNS} WHERE food_name = ? COLLATE NOCASE ORDER BY id LIMIT 1");
        self.conn
            .query_row(&query, params![name], map_record_row)
            .optional()
    }

    pub fn nutrition_containing(&self, fragment: &str) -> Result<Option<NutritionRecord>> {
        let query = format!(
            "{SELECT_COLUMNS} WHERE instr(lower(food_name), lower(?)) > 0 ORDER BY id LIMIT 1"
        );
        self.conn
            .query_row(&query, params![fragment], map_record_row)
            .optional()
    }

    /// Foods whose names contain every fragment, in insertion order
    pub fn nutrition_containing_all(
        &self,
        fragments: &[String],
        limit: usize,
    ) -> Result<Vec<NutritionRecord>> {
        if fragments.is_empty() {
            return Ok(Vec::new());
        }

        let where_clauses: Vec<&str> = fragments
            .iter()
            .map(|_| "instr(lower(food_name), lower(?)) > 0")
            .collect();
        let query = format!(
            "{SELECT_COLUMNS} WHERE {} ORDER BY id LIMIT ?",
            where_clauses.join(" AND ")
        );

        let mut params: Vec<Value> = fragments.iter().map(|f| Value::Text(f.clone())).collect();
        params.push(Value::Integer(limit as i64));
        let param_refs: Vec<&dyn rusqlite::ToSql> =
            params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();

        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(param_refs.as_slice(), map_record_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

impl NutritionLookup for Db {
    fn find_exact(&self, name: &str) -> std::result::Result<Option<NutritionRecord>, DatasetError> {
        Ok(self.nutrition_by_name(name)?)
    }

    fn find_containing(
        &self,
        fragment: &str,
    ) -> std::result::Result<Option<NutritionRecord>, DatasetError> {
        Ok(self.nutrition_containing(fragment)?)
    }

    fn find_containing_all(
        &self,
        fragments: &[String],
        limit: usize,
    ) -> std::result::Result<Vec<NutritionRecord>, DatasetError> {
        Ok(self.nutrition_containing_all(fragments, limit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Db {
        let db = Db::open_in_memory().unwrap();
        for name in ["모듬찌개_간편조리세트", "김치찌개", "김치볶음밥", "Pizza", "100%_과일주스"] {
            db.insert_nutrition(&NutritionRecord::named(name)).unwrap();
        }
        db
    }

    #[test]
    fn test_insert_ignores_duplicates() {
        let db = seeded();
        assert!(!db.insert_nutrition(&NutritionRecord::named("김치찌개")).unwrap());
        assert_eq!(db.count_nutrition().unwrap(), 5);
    }

    #[test]
    fn test_default_serving_size() {
        let db = seeded();
        let rec = db.nutrition_by_name("김치찌개").unwrap().unwrap();
        assert_eq!(rec.serving_size_grams, Some(100.0));
        assert_eq!(rec.calories, None);
    }

    #[test]
    fn test_exact_lookup_ignores_ascii_case() {
        let db = seeded();
        assert_eq!(db.find_exact("PIZZA").unwrap().unwrap().food_name, "Pizza");
        assert!(db.find_exact("김치").unwrap().is_none());
    }

    #[test]
    fn test_containing_is_literal() {
        let db = seeded();
        // "_" and "%" are plain characters, not LIKE wildcards
        assert!(db.find_containing("%_").unwrap().is_some());
        assert!(db.find_containing("치_").unwrap().is_none());
        assert_eq!(
            db.find_containing("찌개").unwrap().unwrap().food_name,
            "모듬찌개_간편조리세트"
        );
    }

    #[test]
    fn test_containing_all() {
        let db = seeded();
        let hits = db
            .find_containing_all(&["찌개".to_string(), "김치".to_string()], 10)
            .unwrap();
        let names: Vec<&str> = hits.iter().map(|r| r.food_name.as_str()).collect();
        assert_eq!(names, vec!["김치찌개"]);

        let capped = db.find_containing_all(&["김치".to_string()], 1).unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].food_name, "김치찌개");
    }
}
