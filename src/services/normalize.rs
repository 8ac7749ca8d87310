use crate::domain::models::{ActivityItem, ExcludedItem, ExclusionReason, NormalizedItem};

/// Output of the normalization stage. Input order is preserved in both
/// vectors; no item is ever dropped, only moved to `excluded`.
pub struct NormalizedBatch {
    pub items: Vec<NormalizedItem>,
    pub excluded: Vec<ExcludedItem>,
}

pub fn normalize_items(raw: &[ActivityItem]) -> NormalizedBatch {
    let mut items = Vec::with_capacity(raw.len());
    let mut excluded = Vec::new();

    for item in raw {
        let Some(raw_text) = item.raw_text.as_deref() else {
            excluded.push(ExcludedItem {
                id: item.id.clone(),
                reason: ExclusionReason::MissingRawText,
            });
            continue;
        };
        items.push(NormalizedItem {
            id: item.id.clone(),
            kind: item.kind,
            community: item.community.clone(),
            created_utc: item.created_utc,
            raw_text: raw_text.to_string(),
            normalized_text: normalize_text(raw_text),
            score: item.score,
            permalink: item.permalink.clone(),
        });
    }

    NormalizedBatch { items, excluded }
}

/// Strips quoted blocks, code fences, URLs, and markdown markup, then
/// collapses whitespace. The result may be empty; callers decide what an
/// empty normalized text means (the scorer excludes such items).
pub fn normalize_text(raw: &str) -> String {
    let mut kept_lines = Vec::new();
    let mut in_fence = false;
    for line in raw.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || trimmed.starts_with('>') {
            continue;
        }
        kept_lines.push(line);
    }

    let unlinked = strip_link_syntax(&kept_lines.join(" "));

    let mut words = Vec::new();
    for token in unlinked.split_whitespace() {
        if is_url(token) {
            continue;
        }
        let cleaned: String = token
            .chars()
            .filter(|c| !matches!(c, '*' | '_' | '~' | '#' | '`' | '\\' | '|'))
            .collect();
        if !cleaned.is_empty() {
            words.push(cleaned);
        }
    }
    words.join(" ")
}

fn is_url(token: &str) -> bool {
    let t = token.trim_start_matches(['(', '[', '<']);
    t.starts_with("http://") || t.starts_with("https://") || t.starts_with("www.")
}

/// Rewrites `[label](target)` to `label`. Unbalanced brackets pass
/// through unchanged.
fn strip_link_syntax(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '[' {
            if let Some(close) = find_from(&chars, i + 1, ']') {
                if chars.get(close + 1) == Some(&'(') {
                    if let Some(paren_close) = find_from(&chars, close + 2, ')') {
                        out.extend(&chars[i + 1..close]);
                        i = paren_close + 1;
                        continue;
                    }
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn find_from(chars: &[char], start: usize, needle: char) -> Option<usize> {
    chars[start..].iter().position(|c| *c == needle).map(|p| p + start)
}
