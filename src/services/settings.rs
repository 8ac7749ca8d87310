use crate::domain::constants::DEFAULT_RULES_TOML;
use crate::domain::models::Band;
use crate::services::inference::{parse_rules, RuleTable};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SentimentThresholds {
    pub positive: f64,
    pub negative: f64,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            positive: 0.1,
            negative: -0.1,
        }
    }
}

impl SentimentThresholds {
    pub fn band(&self, polarity: f64) -> Band {
        if polarity > self.positive {
            Band::Positive
        } else if polarity < self.negative {
            Band::Negative
        } else {
            Band::Neutral
        }
    }
}

/// Analysis configuration. Loaded once per run, never mutated during one.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sentiment: SentimentThresholds,
    pub top_communities: usize,
    pub keyword_count: usize,
    pub min_token_len: usize,
    pub weight_keywords_by_score: bool,
    pub extra_stopwords: Vec<String>,
    pub fetch_limit: usize,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sentiment: SentimentThresholds::default(),
            top_communities: 10,
            keyword_count: 15,
            min_token_len: 3,
            weight_keywords_by_score: true,
            extra_stopwords: Vec::new(),
            fetch_limit: 100,
            output_dir: PathBuf::from("output"),
        }
    }
}

fn settings_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".config/redsona/analysis.toml"))
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

/// Loads the trait rule table: the given file when present, the built-in
/// table otherwise. Validation failures abort before any item is
/// processed.
pub fn load_rules(path: Option<&Path>) -> anyhow::Result<RuleTable> {
    match path {
        Some(p) => {
            let raw = std::fs::read_to_string(p)?;
            Ok(parse_rules(&raw)?)
        }
        None => Ok(parse_rules(DEFAULT_RULES_TOML)?),
    }
}
