use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use nutriscan::config::Config;
use nutriscan::db::Db;
use nutriscan::inbody::extractor::FieldExtractor;
use nutriscan::meal::MatchOutcome;
use nutriscan::meal::matcher::FoodMatcher;
use nutriscan::pipeline;
use nutriscan::upstream::clova::ClovaOcrClient;
use nutriscan::upstream::google::GoogleVisionClient;
use nutriscan::upstream::{OcrService, VisionService};
use nutriscan::upstream::recorded::{RecordedOcr, RecordedVision};

#[derive(Parser)]
#[command(name = "nutriscan")]
#[command(about = "InBody sheet extraction and meal photo matching")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a nutrition CSV into the dataset database
    Import {
        /// CSV file with a 식품명 column
        csv: PathBuf,

        /// Database path (defaults to db_path from the config)
        #[arg(long)]
        db: Option<String>,
    },
    /// Extract body composition from an InBody result sheet
    Inbody(InbodyArgs),
    /// Match a labeled meal photo against the dataset
    Meal(MealArgs),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InbodyArgs {
    /// Sheet image, sent to the configured OCR service
    #[arg(long)]
    image: Option<PathBuf>,

    /// Saved OCR response (JSON), processed offline
    #[arg(long)]
    response: Option<PathBuf>,
}

#[derive(Args)]
struct MealArgs {
    #[command(flatten)]
    source: MealSource,

    /// Database path (defaults to db_path from the config)
    #[arg(long)]
    db: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct MealSource {
    /// Meal photo, sent to the configured vision service
    #[arg(long)]
    image: Option<PathBuf>,

    /// Saved vision annotate response (JSON), processed offline
    #[arg(long)]
    response: Option<PathBuf>,
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read image: {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    config.validate().context("invalid configuration")?;

    match cli.command {
        Commands::Import { csv, db } => {
            let db_path = db.unwrap_or_else(|| config.db_path.clone());
            let mut db = Db::open(&db_path).context("Failed to open database")?;
            let summary = db.import_nutrition_csv(&csv, true)?;
            info!(
                "imported {} rows ({} skipped, {} duplicates)",
                summary.inserted, summary.skipped, summary.duplicates
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Inbody(args) => run_inbody(&config, args)?,
        Commands::Meal(args) => run_meal(&config, args)?,
    }

    Ok(())
}

fn run_inbody(config: &Config, args: InbodyArgs) -> Result<()> {
    let (ocr, image): (Box<dyn OcrService>, Vec<u8>) = match (args.image, args.response) {
        (Some(image), _) => (
            Box::new(ClovaOcrClient::new(&config.ocr)),
            read_image(&image)?,
        ),
        (None, Some(response)) => (Box::new(RecordedOcr::load(&response)?), Vec::new()),
        (None, None) => anyhow::bail!("either --image or --response is required"),
    };

    let record = pipeline::analyze_inbody(&*ocr, &image, &FieldExtractor::default())?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn run_meal(config: &Config, args: MealArgs) -> Result<()> {
    let (vision, image): (Box<dyn VisionService>, Vec<u8>) =
        match (args.source.image, args.source.response) {
            (Some(image), _) => (
                Box::new(GoogleVisionClient::new(&config.vision_api)),
                read_image(&image)?,
            ),
            (None, Some(response)) => (Box::new(RecordedVision::load(&response)?), Vec::new()),
            (None, None) => anyhow::bail!("either --image or --response is required"),
        };

    let db_path = args.db.unwrap_or_else(|| config.db_path.clone());
    let db = Db::open(&db_path).context("Failed to open database")?;
    let matcher = FoodMatcher::from_config(config);

    let outcome = pipeline::analyze_meal(&*vision, &image, &matcher, &db)?;
    if let MatchOutcome::NotFound { recognized_labels } = &outcome {
        let labels: Vec<&str> = recognized_labels.iter().map(|l| l.label.as_str()).collect();
        eprintln!("No matching food found. Try another photo. Recognized: {labels:?}");
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
