//! Gallery reconstruction: the pure half of the read path.
//!
//! The pipeline crate enumerates artifacts and fetches metadata; everything
//! in between (thumbnail filtering, ordering, truncation, the join itself and
//! retention planning) lives here so it can be tested without any backend.

use std::cmp::Ordering;

use crate::generation::{ArtifactDescriptor, GalleryItem, GenerationRecord};
use crate::naming;

/// Default upper bound on items processed by a single gallery read.
pub const DEFAULT_GALLERY_LIMIT: usize = 20;

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Newest-first comparator: upload time descending, then name descending.
///
/// Names embed time-ordered tokens, so the tiebreak keeps creation order for
/// artifacts uploaded within the store's timestamp resolution.
fn newest_first(a: &ArtifactDescriptor, b: &ArtifactDescriptor) -> Ordering {
    b.uploaded_at
        .cmp(&a.uploaded_at)
        .then_with(|| b.name.cmp(&a.name))
}

/// Drop thumbnail objects, leaving one entry per generation.
pub fn primary_artifacts(artifacts: Vec<ArtifactDescriptor>) -> Vec<ArtifactDescriptor> {
    artifacts
        .into_iter()
        .filter(|a| !naming::is_thumbnail(&a.name))
        .collect()
}

/// Sort artifacts newest first.
pub fn sort_newest_first(artifacts: &mut [ArtifactDescriptor]) {
    artifacts.sort_by(newest_first);
}

/// Resolve the effective item cap for one read.
///
/// A request may ask for fewer items than the configured cap but never more.
/// `Some(0)` is honoured and yields an empty page.
pub fn effective_limit(requested: Option<usize>, cap: usize) -> usize {
    requested.map_or(cap, |n| n.min(cap))
}

// ---------------------------------------------------------------------------
// View planning
// ---------------------------------------------------------------------------

/// The artifacts selected for one gallery read, before metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryPlan {
    /// Number of primary artifacts that exist, before truncation.
    pub total: usize,
    /// The newest `limit` primary artifacts, newest first.
    pub selected: Vec<ArtifactDescriptor>,
}

/// Filter, order and truncate a raw listing.
///
/// Truncation happens before any metadata lookup so the number of index
/// calls per read is bounded by `limit`.
pub fn plan_view(artifacts: Vec<ArtifactDescriptor>, limit: usize) -> GalleryPlan {
    let mut primary = primary_artifacts(artifacts);
    let total = primary.len();
    sort_newest_first(&mut primary);
    primary.truncate(limit);
    GalleryPlan {
        total,
        selected: primary,
    }
}

/// Join selected artifacts with their metadata lookups.
///
/// `records[i]` is the lookup result for `selected[i]`; a missing or `None`
/// entry produces a degraded item rather than an error.
pub fn join_metadata(
    selected: &[ArtifactDescriptor],
    records: Vec<Option<GenerationRecord>>,
) -> Vec<GalleryItem> {
    let mut records = records.into_iter();
    selected
        .iter()
        .map(|artifact| match records.next().flatten() {
            Some(record) => GalleryItem::from_record(record),
            None => GalleryItem::degraded(artifact),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Retention planning
// ---------------------------------------------------------------------------

/// Split of primary artifacts for a retain-newest-N sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPlan {
    pub keep: Vec<ArtifactDescriptor>,
    pub remove: Vec<ArtifactDescriptor>,
}

/// Keep the newest `keep` primary artifacts and mark the rest for removal.
///
/// Thumbnails are not planned individually; removing a primary artifact
/// removes its thumbnail with it.
pub fn plan_retention(artifacts: Vec<ArtifactDescriptor>, keep: usize) -> RetentionPlan {
    let mut primary = primary_artifacts(artifacts);
    sort_newest_first(&mut primary);
    let remove = if primary.len() > keep {
        primary.split_off(keep)
    } else {
        Vec::new()
    };
    RetentionPlan {
        keep: primary,
        remove,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::Timestamp;

    fn ts(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn artifact(name: &str, secs: i64) -> ArtifactDescriptor {
        ArtifactDescriptor {
            name: name.to_string(),
            url: format!("https://cdn/{name}"),
            uploaded_at: ts(secs),
        }
    }

    fn record_for(a: &ArtifactDescriptor, prompt: &str) -> GenerationRecord {
        GenerationRecord {
            original_prompt: prompt.to_string(),
            generated_prompt: prompt.to_string(),
            image_url: a.url.clone(),
            thumbnail_url: a.url.replace(".png", "_thumb.jpg"),
            created_at: a.uploaded_at,
        }
    }

    #[test]
    fn plan_filters_thumbnails_and_sorts_newest_first() {
        let listing = vec![
            artifact("a.png", 10),
            artifact("a_thumb.jpg", 10),
            artifact("c.png", 30),
            artifact("b.png", 20),
            artifact("c_thumb.jpg", 30),
        ];
        let plan = plan_view(listing, 20);
        assert_eq!(plan.total, 3);
        let names: Vec<_> = plan.selected.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["c.png", "b.png", "a.png"]);
    }

    #[test]
    fn plan_truncates_after_sorting() {
        let listing = (0..30).map(|i| artifact(&format!("{i:02}.png"), i)).collect();
        let plan = plan_view(listing, 5);
        assert_eq!(plan.total, 30);
        assert_eq!(plan.selected.len(), 5);
        assert_eq!(plan.selected[0].name, "29.png");
        assert_eq!(plan.selected[4].name, "25.png");
    }

    #[test]
    fn equal_timestamps_fall_back_to_name_order() {
        let listing = vec![artifact("0001.png", 5), artifact("0002.png", 5)];
        let plan = plan_view(listing, 20);
        assert_eq!(plan.selected[0].name, "0002.png");
    }

    #[test]
    fn ordering_is_non_increasing() {
        let listing = vec![
            artifact("x.png", 3),
            artifact("y.png", 9),
            artifact("z.png", 1),
            artifact("w.png", 9),
        ];
        let plan = plan_view(listing, 20);
        for pair in plan.selected.windows(2) {
            assert!(pair[0].uploaded_at >= pair[1].uploaded_at);
        }
    }

    #[test]
    fn join_degrades_missing_metadata() {
        let selected = vec![artifact("b.png", 2), artifact("a.png", 1)];
        let records = vec![None, Some(record_for(&selected[1], "A"))];
        let items = join_metadata(&selected, records);
        assert_eq!(items.len(), 2);
        assert!(items[0].is_degraded());
        assert_eq!(items[0].image_url, "https://cdn/b.png");
        assert_eq!(items[0].created_at, ts(2));
        assert_eq!(items[1].original_prompt, "A");
        assert_eq!(items[1].thumbnail_url, "https://cdn/a_thumb.jpg");
    }

    #[test]
    fn join_tolerates_short_record_list() {
        let selected = vec![artifact("a.png", 1)];
        let items = join_metadata(&selected, Vec::new());
        assert_eq!(items.len(), 1);
        assert!(items[0].is_degraded());
    }

    #[test]
    fn effective_limit_caps_requests() {
        assert_eq!(effective_limit(None, 20), 20);
        assert_eq!(effective_limit(Some(5), 20), 5);
        assert_eq!(effective_limit(Some(500), 20), 20);
        assert_eq!(effective_limit(Some(0), 20), 0);
    }

    #[test]
    fn retention_keeps_newest() {
        let listing = vec![
            artifact("a.png", 1),
            artifact("a_thumb.jpg", 1),
            artifact("b.png", 2),
            artifact("c.png", 3),
        ];
        let plan = plan_retention(listing, 1);
        assert_eq!(plan.keep.len(), 1);
        assert_eq!(plan.keep[0].name, "c.png");
        let removed: Vec<_> = plan.remove.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(removed, ["b.png", "a.png"]);
    }

    #[test]
    fn retention_with_large_n_removes_nothing() {
        let listing = vec![artifact("a.png", 1), artifact("b.png", 2)];
        let plan = plan_retention(listing, 10);
        assert_eq!(plan.keep.len(), 2);
        assert!(plan.remove.is_empty());
    }

    #[test]
    fn retention_to_zero_removes_everything() {
        let listing = vec![artifact("a.png", 1), artifact("b.png", 2)];
        let plan = plan_retention(listing, 0);
        assert!(plan.keep.is_empty());
        assert_eq!(plan.remove.len(), 2);
    }

    #[test]
    fn retention_is_idempotent() {
        let listing = vec![artifact("a.png", 1), artifact("b.png", 2), artifact("c.png", 3)];
        let first = plan_retention(listing, 2);
        let second = plan_retention(first.keep.clone(), 2);
        assert!(second.remove.is_empty());
        assert_eq!(second.keep, first.keep);
    }
}
