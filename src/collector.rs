use crate::domain::models::{ActivityItem, ItemKind};
use crate::services::storage::cache_dir;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "redsona/0.4 (persona analysis)";
const FETCH_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("rate limited by the platform, retry later")]
    RateLimited,
    #[error("invalid profile target: {0}")]
    InvalidTarget(String),
    #[error("activity fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("activity payload malformed: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("activity file error: {0}")]
    File(#[from] std::io::Error),
}

/// Accepts a bare username, `u/<name>`, or a profile URL containing
/// `reddit.com/u/<name>` / `reddit.com/user/<name>`.
pub fn extract_username(target: &str) -> Result<String, CollectError> {
    let t = target.trim().trim_end_matches('/');

    if let Some(pos) = t.find("reddit.com/") {
        let rest = &t[pos + "reddit.com/".len()..];
        let mut parts = rest.split('/');
        return match (parts.next(), parts.next()) {
            (Some("u"), Some(name)) | (Some("user"), Some(name)) if !name.is_empty() => {
                Ok(name.to_string())
            }
            _ => Err(CollectError::InvalidTarget(target.to_string())),
        };
    }

    let bare = t.strip_prefix("u/").unwrap_or(t);
    if !bare.is_empty() && !bare.contains('/') && !bare.contains(' ') && !bare.contains(':') {
        return Ok(bare.to_string());
    }
    Err(CollectError::InvalidTarget(target.to_string()))
}

/// Loads a frozen activity sequence from a local JSON file. Item order is
/// taken from the file as-is; this is both the offline mode and the test
/// fixture format.
pub fn load_activity_file(path: &Path) -> Result<Vec<ActivityItem>, CollectError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Fetches the user's newest submissions and comments and hands back one
/// stable newest-first sequence. Fails before yielding any items on
/// missing users and rate limits; transient fetch failures fall back to
/// the last cached payload when one exists.
pub fn fetch_user_activity(username: &str, limit: usize) -> Result<Vec<ActivityItem>, CollectError> {
    match fetch_remote(username, limit) {
        Ok(items) => {
            if let Some(cache) = cache_path(username) {
                if let Some(parent) = cache.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                if let Ok(body) = serde_json::to_string(&items) {
                    let _ = std::fs::write(&cache, body);
                }
            }
            Ok(items)
        }
        Err(e @ (CollectError::UserNotFound(_) | CollectError::RateLimited)) => Err(e),
        Err(e) => {
            if let Some(cache) = cache_path(username) {
                if cache.exists() {
                    tracing::warn!(user = username, error = %e, "fetch failed, using cached activity");
                    return load_activity_file(&cache);
                }
            }
            Err(e)
        }
    }
}

fn fetch_remote(username: &str, limit: usize) -> Result<Vec<ActivityItem>, CollectError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
        .user_agent(USER_AGENT)
        .build()?;

    let mut items = Vec::new();
    for feed in ["submitted", "comments"] {
        let url = format!(
            "https://www.reddit.com/user/{}/{}.json?limit={}&sort=new",
            username, feed, limit
        );
        tracing::debug!(%url, "fetching activity feed");
        let resp = client.get(&url).send()?;
        match resp.status() {
            reqwest::StatusCode::NOT_FOUND => {
                return Err(CollectError::UserNotFound(username.to_string()))
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(CollectError::RateLimited),
            _ => {}
        }
        let listing: Listing = resp.error_for_status()?.json()?;
        items.extend(map_listing(listing));
    }
    Ok(merge_newest_first(items))
}

fn cache_path(username: &str) -> Option<PathBuf> {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    let id = hex::encode(hasher.finalize());
    cache_dir()
        .ok()
        .map(|d| d.join("users").join(format!("{}.json", id)))
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Deserialize)]
struct ListingChild {
    kind: String,
    data: ListingItem,
}

#[derive(Deserialize)]
struct ListingItem {
    id: String,
    subreddit: String,
    created_utc: f64,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

fn map_listing(listing: Listing) -> Vec<ActivityItem> {
    listing
        .data
        .children
        .into_iter()
        .filter_map(|child| {
            let kind = match child.kind.as_str() {
                "t3" => ItemKind::Post,
                "t1" => ItemKind::Comment,
                _ => return None,
            };
            let data = child.data;
            let raw_text = match kind {
                ItemKind::Post => join_post_text(data.title.as_deref(), data.selftext.as_deref()),
                ItemKind::Comment => data.body.filter(|b| !b.is_empty()),
            };
            Some(ActivityItem {
                id: data.id,
                kind,
                community: data.subreddit,
                created_utc: data.created_utc as i64,
                raw_text,
                score: data.score,
                permalink: data.permalink.map(absolute_permalink),
            })
        })
        .collect()
}

fn join_post_text(title: Option<&str>, selftext: Option<&str>) -> Option<String> {
    let joined = [title.unwrap_or(""), selftext.unwrap_or("")]
        .join(" ")
        .trim()
        .to_string();
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

fn absolute_permalink(p: String) -> String {
    if p.starts_with('/') {
        format!("https://reddit.com{}", p)
    } else {
        p
    }
}

/// Newest-first, ties broken by ascending id so re-fetches of the same
/// history always hand the engine the same sequence.
fn merge_newest_first(mut items: Vec<ActivityItem>) -> Vec<ActivityItem> {
    items.sort_by(|a, b| {
        b.created_utc
            .cmp(&a.created_utc)
            .then_with(|| a.id.cmp(&b.id))
    });
    items
}
