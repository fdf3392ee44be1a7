/// CSV import of the national food nutrition dataset.
///
/// Expects the standard column headers of the public "음식" nutrition
/// table. The distributed file is EUC-KR; UTF-8 (with or without BOM) is
/// accepted as well.
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use encoding_rs::{EUC_KR, Encoding};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use rusqlite::params;
use tracing::{info, warn};

use super::Db;
use super::models::{DEFAULT_SERVING_GRAMS, ImportSummary, NutritionRecord};

const BATCH_SIZE: usize = 500;

const COL_FOOD_NAME: &str = "식품명";
const COL_SERVING: &str = "영양성분함량기준량";
const COL_CALORIES: &str = "에너지(kcal)";
const COL_PROTEIN: &str = "단백질(g)";
const COL_FAT: &str = "지방(g)";
const COL_CARBS: &str = "탄수화물(g)";
const COL_SUGARS: &str = "당류(g)";
const COL_SODIUM: &str = "나트륨(mg)";
const COL_CHOLESTEROL: &str = "콜레스테롤(mg)";
const COL_TRANS_FAT: &str = "트랜스지방산(g)";

static SERVING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)").expect("valid regex"));

/// Column positions resolved from the header row.
struct Columns {
    food_name: usize,
    serving: Option<usize>,
    calories: Option<usize>,
    protein: Option<usize>,
    fat: Option<usize>,
    carbs: Option<usize>,
    sugars: Option<usize>,
    sodium: Option<usize>,
    cholesterol: Option<usize>,
    trans_fat: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let food_name = find(COL_FOOD_NAME)
            .with_context(|| format!("missing required column: {COL_FOOD_NAME}"))?;

        let columns = Self {
            food_name,
            serving: find(COL_SERVING),
            calories: find(COL_CALORIES),
            protein: find(COL_PROTEIN),
            fat: find(COL_FAT),
            carbs: find(COL_CARBS),
            sugars: find(COL_SUGARS),
            sodium: find(COL_SODIUM),
            cholesterol: find(COL_CHOLESTEROL),
            trans_fat: find(COL_TRANS_FAT),
        };
        if columns.calories.is_none() {
            warn!("column {COL_CALORIES} not found, calories will be empty");
        }
        Ok(columns)
    }
}

fn cell<'r>(row: &'r csv::StringRecord, idx: Option<usize>) -> Option<&'r str> {
    idx.and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Empty or unparsable cells become `None`.
fn parse_nutrient(row: &csv::StringRecord, idx: Option<usize>) -> Option<f64> {
    cell(row, idx).and_then(|s| s.parse::<f64>().ok())
}

/// First number in the serving column ("100g" → 100); defaults to 100.
fn parse_serving(row: &csv::StringRecord, idx: Option<usize>) -> f64 {
    cell(row, idx)
        .and_then(|s| SERVING_NUMBER.captures(s))
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .unwrap_or(DEFAULT_SERVING_GRAMS)
}

/// Decode file bytes: BOM first, then strict UTF-8, then EUC-KR.
fn decode_csv(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, had_errors) = EUC_KR.decode_without_bom_handling(bytes);
            if had_errors {
                warn!("CSV is neither UTF-8 nor clean EUC-KR; undecodable bytes replaced");
            }
            text.into_owned()
        }
    }
}

fn parse_row(row: &csv::StringRecord, cols: &Columns) -> Option<NutritionRecord> {
    let food_name = cell(row, Some(cols.food_name))?;
    Some(NutritionRecord {
        food_name: food_name.to_string(),
        serving_size_grams: Some(parse_serving(row, cols.serving)),
        calories: parse_nutrient(row, cols.calories),
        protein: parse_nutrient(row, cols.protein),
        fat: parse_nutrient(row, cols.fat),
        carbs: parse_nutrient(row, cols.carbs),
        sugars: parse_nutrient(row, cols.sugars),
        sodium: parse_nutrient(row, cols.sodium),
        cholesterol: parse_nutrient(row, cols.cholesterol),
        trans_fat: parse_nutrient(row, cols.trans_fat),
    })
}

impl Db {
    /// Import a nutrition CSV. Rows without a name and names seen before
    /// (in the file or already in the table) are skipped.
    pub fn import_nutrition_csv<P: AsRef<Path>>(
        &mut self,
        path: P,
        show_progress: bool,
    ) -> Result<ImportSummary> {
        let path = path.as_ref();
        info!("Importing nutrition data from {}", path.display());

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to open CSV: {}", path.display()))?;
        let text = decode_csv(&bytes);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers().context("failed to read CSV header")?.clone();
        let cols = Columns::resolve(&headers)?;

        let mut summary = ImportSummary::default();
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for (line, row) in reader.records().enumerate() {
            let row = match row {
                Ok(r) => r,
                Err(e) => {
                    warn!("line {}: {e}", line + 2);
                    summary.skipped += 1;
                    continue;
                }
            };
            let Some(record) = parse_row(&row, &cols) else {
                summary.skipped += 1;
                continue;
            };
            if !seen.insert(record.food_name.clone()) {
                summary.duplicates += 1;
                continue;
            }
            records.push(record);
        }

        info!(
            "Parsed {} rows ({} skipped, {} duplicates)",
            records.len(),
            summary.skipped,
            summary.duplicates
        );

        let pb = if show_progress {
            let pb = ProgressBar::new(records.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .context("invalid progress template")?
                    .progress_chars("█▓░"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        for batch in records.chunks(BATCH_SIZE) {
            let tx = self.conn.transaction()?;
            for r in batch {
                let rows = tx.execute(
                    r#"
                    INSERT OR IGNORE INTO nutrition_data
                        (food_name, serving_size_grams, calories, protein, fat, carbs,
                         sugars, sodium, cholesterol, trans_fat)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                    params![
                        r.food_name,
                        r.serving_size_grams,
                        r.calories,
                        r.protein,
                        r.fat,
                        r.carbs,
                        r.sugars,
                        r.sodium,
                        r.cholesterol,
                        r.trans_fat,
                    ],
                )?;
                if rows > 0 {
                    summary.inserted += 1;
                } else {
                    summary.duplicates += 1;
                }
            }
            tx.commit()?;
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        info!(
            "Import finished: {} inserted, {} skipped, {} duplicates",
            summary.inserted, summary.skipped, summary.duplicates
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = concat!(
        "식품코드,식품명,영양성분함량기준량,에너지(kcal),단백질(g),지방(g),",
        "탄수화물(g),당류(g),나트륨(mg),콜레스테롤(mg),트랜스지방산(g)"
    );

    fn write_csv(dir: &tempfile::TempDir, rows: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("food.csv");
        let mut content = String::from(HEADER);
        for r in rows {
            content.push('\n');
            content.push_str(r);
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_import_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            &[
                "D101,김치찌개,400g,245,14.2,12.1,18.3,4.1,1820,35,0.1",
                "D102,순두부찌개,,190,,9.5,11,,,,",
                "D103,,100g,10,1,1,1,1,1,1,1",
                "D104,김치찌개,300g,200,1,1,1,1,1,1,1",
            ],
        );

        let mut db = Db::open_in_memory().unwrap();
        let summary = db.import_nutrition_csv(&path, false).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                inserted: 2,
                skipped: 1,
                duplicates: 1
            }
        );

        let kimchi = db.nutrition_by_name("김치찌개").unwrap().unwrap();
        assert_eq!(kimchi.serving_size_grams, Some(400.0));
        assert_eq!(kimchi.calories, Some(245.0));
        assert_eq!(kimchi.trans_fat, Some(0.1));

        let sundubu = db.nutrition_by_name("순두부찌개").unwrap().unwrap();
        assert_eq!(sundubu.serving_size_grams, Some(100.0));
        assert_eq!(sundubu.protein, None);
        assert_eq!(sundubu.carbs, Some(11.0));
    }

    #[test]
    fn test_reimport_counts_existing_as_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, &["D101,김치찌개,400g,245,14.2,12.1,18.3,4.1,1820,35,0.1"]);

        let mut db = Db::open_in_memory().unwrap();
        db.import_nutrition_csv(&path, false).unwrap();
        let again = db.import_nutrition_csv(&path, false).unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(again.duplicates, 1);
        assert_eq!(db.count_nutrition().unwrap(), 1);
    }

    #[test]
    fn test_import_euc_kr_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("euc-kr.csv");
        let (bytes, _, unmappable) = EUC_KR.encode("식품명,에너지(kcal)\n김치찌개,210\n");
        assert!(!unmappable);
        assert!(std::str::from_utf8(&bytes).is_err());
        fs::write(&path, &bytes).unwrap();

        let mut db = Db::open_in_memory().unwrap();
        let summary = db.import_nutrition_csv(&path, false).unwrap();
        assert_eq!(summary.inserted, 1);

        let kimchi = db.nutrition_by_name("김치찌개").unwrap().unwrap();
        assert_eq!(kimchi.calories, Some(210.0));
    }

    #[test]
    fn test_import_utf8_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("식품명,에너지(kcal)\n된장찌개,150\n".as_bytes());
        fs::write(&path, &bytes).unwrap();

        let mut db = Db::open_in_memory().unwrap();
        db.import_nutrition_csv(&path, false).unwrap();
        let stew = db.nutrition_by_name("된장찌개").unwrap().unwrap();
        assert_eq!(stew.calories, Some(150.0));
    }

    #[test]
    fn test_missing_name_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "code,name\n1,kimchi").unwrap();

        let mut db = Db::open_in_memory().unwrap();
        assert!(db.import_nutrition_csv(&path, false).is_err());
    }
}
