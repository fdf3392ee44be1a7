//! # nutriscan — Body-composition and meal recognition
//!
//! Turns the raw output of two recognition services into structured records:
//! OCR text of an InBody result sheet becomes a [`inbody::BodyComposition`],
//! and vision labels of a meal photo become ranked candidates from a Korean
//! nutrition dataset.
//!
//! ## Architecture
//!
//! - **[`config`]** — JSON configuration: credentials, label filters, keywords, scoring
//! - **[`upstream`]** — Service traits, Clova OCR and Cloud Vision clients, recorded responses
//! - **[`inbody`]** — Token normalization, section location, table-driven field extraction
//! - **[`meal`]** — Label selection, keyword normalization, candidate generation, ranking
//! - **[`dataset`]** — Nutrition lookup trait and in-memory dataset
//! - **[`db`]** — SQLite nutrition store and CSV import
//! - **[`pipeline`]** — Per-request entry points tying the above together

pub mod config;
pub mod dataset;
pub mod db;
pub mod inbody;
pub mod meal;
pub mod pipeline;
pub mod upstream;
