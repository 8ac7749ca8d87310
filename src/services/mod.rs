//! Service layer containing the analysis stages and side-effect helpers.
//!
//! ## Service map
//! - `settings.rs` — analysis configuration + trait rule table loading.
//! - `normalize.rs` — raw text cleanup, malformed-item exclusion.
//! - `sentiment.rs` — lexicon polarity/subjectivity scoring + banding.
//! - `engagement.rs` — per-community counts/shares with top-K folding.
//! - `interests.rs` — keyword extraction with citable example items.
//! - `inference.rs` — data-driven trait rule evaluation + evidence binding.
//! - `pipeline.rs` — stage composition for one analysis run.
//! - `report.rs` — section assembly and deterministic text rendering.
//! - `storage.rs` — atomic report persistence + audit log + cache paths.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Pipeline stages are pure; side effects live in `storage.rs` and the
//!   collector only.
//! - Keep command handlers thin; delegate to services.

pub mod engagement;
pub mod inference;
pub mod interests;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod settings;
pub mod storage;
