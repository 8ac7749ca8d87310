use crate::domain::models::{ActivityItem, EngagementEntry};
use std::collections::BTreeMap;

/// Residual bucket label for communities beyond the top-K cutoff.
pub const OTHER_BUCKET: &str = "other";

/// Ranked community groups plus the folded top-K view used in the report.
/// Ordering is deterministic: descending item count, ties broken by
/// ascending community name, so identical input always ranks identically
/// regardless of arrival order.
pub struct EngagementSummary {
    pub entries: Vec<EngagementEntry>,
    pub communities: Vec<CommunityGroup>,
}

pub struct CommunityGroup {
    pub community: String,
    pub member_ids: Vec<String>,
}

impl EngagementSummary {
    pub fn top_community(&self) -> Option<&CommunityGroup> {
        self.communities.first()
    }
}

/// Groups all items (scored or not) by community. Shares are fractions of
/// the full input, so the folded entries always sum to 1.0 up to float
/// rounding.
pub fn aggregate(items: &[ActivityItem], top_k: usize) -> EngagementSummary {
    let total = items.len();
    let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for item in items {
        groups
            .entry(item.community.as_str())
            .or_default()
            .push(item.id.clone());
    }

    let mut communities: Vec<CommunityGroup> = groups
        .into_iter()
        .map(|(community, member_ids)| CommunityGroup {
            community: community.to_string(),
            member_ids,
        })
        .collect();
    communities.sort_by(|a, b| {
        b.member_ids
            .len()
            .cmp(&a.member_ids.len())
            .then_with(|| a.community.cmp(&b.community))
    });

    let mut entries: Vec<EngagementEntry> = communities
        .iter()
        .take(top_k)
        .map(|g| EngagementEntry {
            community: g.community.clone(),
            item_count: g.member_ids.len(),
            share: g.member_ids.len() as f64 / total as f64,
        })
        .collect();

    if communities.len() > top_k {
        let residual: usize = communities[top_k..]
            .iter()
            .map(|g| g.member_ids.len())
            .sum();
        entries.push(EngagementEntry {
            community: OTHER_BUCKET.to_string(),
            item_count: residual,
            share: residual as f64 / total as f64,
        });
    }

    EngagementSummary {
        entries,
        communities,
    }
}
