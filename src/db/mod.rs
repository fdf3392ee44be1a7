//! Nutrition reference store on SQLite
use rusqlite::{Connection, Result};
use std::path::Path;
use tracing::info;

pub mod import;
pub mod models;
pub mod nutrition;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS nutrition_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    food_name TEXT NOT NULL UNIQUE,
    serving_size_grams REAL DEFAULT 100.0,
    calories REAL,
    protein REAL,
    fat REAL,
    carbs REAL,
    sugars REAL,
    sodium REAL,
    cholesterol REAL,
    trans_fat REAL
);

CREATE INDEX IF NOT EXISTS idx_food_name ON nutrition_data(food_name);
"#;

/// A wrapper around a SQLite connection initialized with the nutrition schema.
pub struct Db {
    pub(crate) conn: Connection,
}

impl Db {
    /// Open a database connection at the given path and initialize the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Initializing database: {}", path.display());

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;

        info!("Database initialized successfully");

        Ok(Self { conn })
    }

    /// Open an in-memory database connection (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }
}
