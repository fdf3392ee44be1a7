/// End-to-end integration tests for the nutriscan pipelines.
///
/// Tests the complete flows:
///   saved OCR response → tokens → extraction → JSON
///   nutrition CSV → DB → vision response → matching → ranking
use nutriscan::config::Config;
use nutriscan::db::Db;
use nutriscan::inbody::extractor::FieldExtractor;
use nutriscan::meal::matcher::FoodMatcher;
use nutriscan::meal::{MatchOutcome, MatchTier};
use nutriscan::pipeline;
use nutriscan::upstream::recorded::{RecordedOcr, RecordedVision};
use std::fs;
use tempfile::tempdir;

fn ocr_response(texts: &[&str]) -> String {
    let fields: Vec<serde_json::Value> = texts
        .iter()
        .map(|t| serde_json::json!({ "inferText": t, "inferConfidence": 0.98 }))
        .collect();
    serde_json::json!({
        "version": "V2",
        "images": [{ "name": "inbody", "inferResult": "SUCCESS", "fields": fields }]
    })
    .to_string()
}

const NUTRITION_CSV: &str = "\
식품코드,식품명,영양성분함량기준량,에너지(kcal),단백질(g),지방(g),탄수화물(g),당류(g),나트륨(mg),콜레스테롤(mg),트랜스지방산(g)
D101,모듬찌개_간편조리세트,500g,650,40,30,50,8,2800,90,0.2
D102,김치찌개,400g,210,14.5,11.2,12.8,3.1,1890,35,0
D103,배추김치,100g,18,1.3,0.4,3.5,1.2,620,,
D104,김치찌개,400g,999,,,,,,,
D105,,100g,1,1,1,1,1,1,1,1";

/// Full InBody flow from a saved OCR response file
#[test]
fn test_inbody_pipeline_from_saved_response() {
    let temp_dir = tempdir().unwrap();
    let response_path = temp_dir.path().join("ocr.json");
    fs::write(
        &response_path,
        ocr_response(&[
            "InBody",
            "172.4cm",
            "체성분분석",
            "체중",
            "(kg)",
            "70.5",
            "(55.0~75.0)",
            "골격근량",
            "(kg)",
            "31.2",
            "체지방량",
            "(kg)",
            "14.8",
            "BMI",
            "23.7",
            "기초대사량",
            "1552.6",
            "내장지방레벨",
            "10",
            "12",
            "체중",
            "(kg)",
            "55.0",
            "신체변화",
            "체수분",
            "(L)",
            "40.1",
        ]),
    )
    .unwrap();

    // 1. Recognize + extract
    let ocr = RecordedOcr::load(&response_path).unwrap();
    let record = pipeline::analyze_inbody(&ocr, &[], &FieldExtractor::default()).unwrap();

    // 2. Fields inside the composition section
    assert_eq!(record.height, Some(172.4));
    assert_eq!(record.weight, Some(70.5), "first weight must win");
    assert_eq!(record.muscle_mass, Some(31.2));
    assert_eq!(record.fat_mass, Some(14.8));
    assert_eq!(record.bmi, Some(23.7));
    assert_eq!(record.basal_metabolic_rate, Some(1553));
    assert_eq!(record.visceral_fat_level, Some(12), "baseline 10 is skipped");

    // 3. History section is never read
    assert_eq!(record.body_water, None);
    assert!(record.test_date.is_some());

    // 4. JSON shape
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["weight"], 70.5);
    assert_eq!(json["visceralFatLevel"], 12);
    assert!(json["bodyWater"].is_null());
}

/// Import the dataset, then match a two-keyword meal against it
#[test]
fn test_meal_pipeline_against_imported_dataset() {
    let temp_dir = tempdir().unwrap();
    let csv_path = temp_dir.path().join("food.csv");
    fs::write(&csv_path, NUTRITION_CSV).unwrap();

    // 1. Import into an on-disk DB
    let db_path = temp_dir.path().join("nutrition.db");
    let mut db = Db::open(&db_path).unwrap();
    let summary = db.import_nutrition_csv(&csv_path, false).unwrap();
    assert_eq!(summary.inserted, 3);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.skipped, 1);

    // 2. Saved vision response in batch form
    let vision_path = temp_dir.path().join("vision.json");
    fs::write(
        &vision_path,
        r#"{"responses": [{
            "labelAnnotations": [
                {"description": "Food", "score": 0.97},
                {"description": "Stew", "score": 0.91},
                {"description": "Kimchi", "score": 0.86},
                {"description": "Tableware", "score": 0.8}
            ],
            "localizedObjectAnnotations": []
        }]}"#,
    )
    .unwrap();
    let vision = RecordedVision::load(&vision_path).unwrap();

    // 3. Match
    let matcher = FoodMatcher::from_config(&Config::default());
    let outcome = pipeline::analyze_meal(&vision, &[], &matcher, &db).unwrap();
    let MatchOutcome::Found(result) = outcome else {
        panic!("expected a match");
    };

    assert_eq!(result.recommended.food_name, "김치찌개");
    assert_eq!(result.recommended.match_tier, MatchTier::MultiKeyword);
    assert_eq!(result.recommended.nutrients.calories, 210.0);
    assert_eq!(result.recommended.nutrients.serving_size_grams, 400.0);

    let names: Vec<&str> = result.candidates.iter().map(|c| c.food_name.as_str()).collect();
    assert!(names.contains(&"모듬찌개_간편조리세트"));
    assert_eq!(result.recognized_labels.len(), 2);
    assert!(
        result
            .candidates
            .windows(2)
            .all(|w| w[0].confidence_score >= w[1].confidence_score),
        "candidates must be sorted by score"
    );

    // 4. Same input, same output
    let again = pipeline::analyze_meal(&vision, &[], &matcher, &db).unwrap();
    assert_eq!(again.recommended().unwrap().food_name, "김치찌개");
    assert_eq!(
        serde_json::to_string(&again).unwrap(),
        serde_json::to_string(&MatchOutcome::Found(result)).unwrap()
    );
}

/// Nothing above the score threshold is a not-found answer, not an error
#[test]
fn test_meal_below_threshold_is_not_found() {
    let db = Db::open_in_memory().unwrap();
    let vision_path = tempdir().unwrap();
    let path = vision_path.path().join("vision.json");
    fs::write(
        &path,
        r#"{"labelAnnotations": [{"description": "Kimchi", "score": 0.31}]}"#,
    )
    .unwrap();

    let vision = RecordedVision::load(&path).unwrap();
    let outcome =
        pipeline::analyze_meal(&vision, &[], &FoodMatcher::default(), &db).unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "not-found");
    assert!(json["recognizedLabels"].as_array().unwrap().is_empty());
}

/// Test config defaults, file loading and validation
#[test]
fn test_config_load_and_validation() {
    let config = Config::default();
    assert_eq!(config.matching.max_candidates, 10);
    assert!(config.validate().is_ok());

    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("custom.json");
    fs::write(&path, r#"{"vision": {"min_score": 0.7}}"#).unwrap();
    let loaded = Config::load(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded.vision.min_score, 0.7);
    assert_eq!(loaded.vision.max_labels, 5);

    // Invalid config
    let mut bad_config = Config::default();
    bad_config.vision.min_score = 1.5;
    assert!(bad_config.validate().is_err());
}
