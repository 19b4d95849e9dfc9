//! Related-content recommendations: rank sibling items of the same kind by
//! how many tags they share with a reference item.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::ContentRecord;
use crate::store::{ContentStore, StoreError};

/// How candidate tags are counted against the reference set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMode {
    /// Size of the set intersection. Duplicate candidate tags count once.
    #[default]
    Distinct,
    /// Every candidate tag that is in the reference set counts, duplicates
    /// included.
    Literal,
}

impl FromStr for OverlapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distinct" => Ok(OverlapMode::Distinct),
            "literal" => Ok(OverlapMode::Literal),
            other => Err(format!("unknown tag overlap mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate<T> {
    pub item: T,
    pub shared_tag_count: usize,
}

pub fn shared_tag_count(reference: &HashSet<&str>, candidate_tags: &[String], mode: OverlapMode) -> usize {
    match mode {
        OverlapMode::Literal => candidate_tags.iter().filter(|t| reference.contains(t.as_str())).count(),
        OverlapMode::Distinct => candidate_tags
            .iter()
            .map(String::as_str)
            .filter(|t| reference.contains(t))
            .collect::<HashSet<_>>()
            .len(),
    }
}

/// Score `pool` against `reference` and keep the best `limit`.
///
/// Sorted by shared tag count descending. Equal scores fall back to
/// [`ContentRecord::ranking_timestamp`] (most recent first); kinds without one
/// keep the pool order. The reference itself and inactive items never appear.
pub fn rank<T: ContentRecord>(
    reference: &T,
    pool: Vec<T>,
    limit: usize,
    mode: OverlapMode,
) -> Vec<ScoredCandidate<T>> {
    if limit == 0 {
        return Vec::new();
    }

    let reference_tags: HashSet<&str> = reference.tags().iter().map(String::as_str).collect();
    let reference_id = reference.id();

    let mut scored: Vec<ScoredCandidate<T>> = pool
        .into_iter()
        .filter(|item| item.id() != reference_id && item.is_active())
        .map(|item| {
            let shared_tag_count = shared_tag_count(&reference_tags, item.tags(), mode);
            ScoredCandidate { item, shared_tag_count }
        })
        .collect();

    // sort_by is stable: untimed ties keep fetch order
    scored.sort_by(|a, b| {
        b.shared_tag_count.cmp(&a.shared_tag_count).then_with(|| {
            match (a.item.ranking_timestamp(), b.item.ranking_timestamp()) {
                (Some(at), Some(bt)) => bt.cmp(&at),
                _ => Ordering::Equal,
            }
        })
    });
    scored.truncate(limit);
    scored
}

/// Store-backed recommender for one content kind
pub struct RelatedContent<T: ContentRecord> {
    store: Arc<dyn ContentStore<T>>,
    mode: OverlapMode,
}

impl<T: ContentRecord> RelatedContent<T> {
    pub fn new(store: Arc<dyn ContentStore<T>>, mode: OverlapMode) -> Self {
        Self { store, mode }
    }

    /// Up to `limit` summaries related to the item identified by `reference_id`.
    ///
    /// Never fails: an unknown or malformed id yields an empty list, and so
    /// does any store error (logged), so a content page can always render.
    pub async fn related(&self, reference_id: &str, limit: usize) -> Vec<T::Summary> {
        let id = match Uuid::parse_str(reference_id.trim()) {
            Ok(id) => id,
            Err(_) => {
                tracing::debug!("Related {} lookup for malformed id '{}'", T::KIND, reference_id);
                return Vec::new();
            }
        };

        match self.try_related(id, limit).await {
            Ok(summaries) => summaries,
            Err(e) => {
                tracing::warn!("Related {} lookup for {} failed: {}", T::KIND, id, e);
                Vec::new()
            }
        }
    }

    async fn try_related(&self, id: Uuid, limit: usize) -> Result<Vec<T::Summary>, StoreError> {
        let Some(reference) = self.store.find_by_id(id).await? else {
            tracing::debug!("Related {} lookup for unknown id {}", T::KIND, id);
            return Ok(Vec::new());
        };

        let pool = self.store.list_active_except(id).await?;
        let pool_size = pool.len();
        let ranked = rank(&reference, pool, limit, self.mode);

        tracing::debug!(
            "Related {} for {}: {} of {} candidates",
            T::KIND,
            reference.slug(),
            ranked.len(),
            pool_size
        );

        Ok(ranked.into_iter().map(|c| c.item.summary()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Blog, CaseStudy};
    use crate::store::MemoryStore;
    use crate::testing::{blog, case_study, FailingPoolStore, FailingStore};
    use chrono::{Duration, TimeZone, Utc};

    fn ids<T: ContentRecord>(ranked: &[ScoredCandidate<T>]) -> Vec<String> {
        ranked.iter().map(|c| c.item.slug().to_string()).collect()
    }

    #[test]
    fn ranks_by_shared_tags() {
        let r = blog("r", &["AI", "NLP"], 0);
        let x = blog("x", &["AI", "NLP", "Ethics"], 0);
        let y = blog("y", &["AI"], 0);
        let z = blog("z", &["Cooking"], 0);

        let ranked = rank(&r, vec![y, z, x], 2, OverlapMode::Distinct);
        assert_eq!(ids(&ranked), vec!["x", "y"]);
        assert_eq!(ranked[0].shared_tag_count, 2);
        assert_eq!(ranked[1].shared_tag_count, 1);
    }

    #[test]
    fn blog_ties_prefer_recent() {
        let r = blog("r", &["rust"], 0);
        let old = blog("old", &["rust"], 10);
        let new = blog("new", &["rust"], 1);
        let untagged = blog("untagged", &[], 0);

        let ranked = rank(&r, vec![old, untagged, new], 5, OverlapMode::Distinct);
        assert_eq!(ids(&ranked), vec!["new", "old", "untagged"]);
    }

    #[test]
    fn case_study_ties_keep_fetch_order() {
        let r = case_study("r", &["fintech", "ml"]);
        let a = case_study("a", &["fintech"]);
        let b = case_study("b", &["fintech"]);
        let c = case_study("c", &["fintech", "ml"]);

        let ranked = rank(&r, vec![b, a, c], 3, OverlapMode::Distinct);
        assert_eq!(ids(&ranked), vec!["c", "b", "a"]);
    }

    #[test]
    fn excludes_reference_and_inactive() {
        let r = blog("r", &["a"], 0);
        let mut hidden = blog("hidden", &["a"], 0);
        hidden.active = false;

        let ranked = rank(&r, vec![r.clone(), hidden, blog("shown", &["a"], 0)], 10, OverlapMode::Distinct);
        assert_eq!(ids(&ranked), vec!["shown"]);
    }

    #[test]
    fn duplicate_tags_depend_on_mode() {
        let reference: HashSet<&str> = ["a", "b"].into_iter().collect();
        let tags = vec!["a".to_string(), "a".to_string(), "c".to_string()];
        assert_eq!(shared_tag_count(&reference, &tags, OverlapMode::Distinct), 1);
        assert_eq!(shared_tag_count(&reference, &tags, OverlapMode::Literal), 2);
    }

    #[test]
    fn zero_limit_is_empty() {
        let r = blog("r", &["a"], 0);
        assert!(rank(&r, vec![blog("x", &["a"], 0)], 0, OverlapMode::Distinct).is_empty());
    }

    #[test]
    fn output_respects_limit_and_order() {
        let r = blog("r", &["a", "b", "c"], 0);
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let pool: Vec<Blog> = (0..20)
            .map(|i| {
                let tags: Vec<&str> = ["a", "b", "c", "d"].into_iter().take(i % 4 + 1).collect();
                let mut b = blog(&format!("p{}", i), &tags, 0);
                b.publish_date = base + Duration::days(i as i64);
                b
            })
            .collect();

        let ranked = rank(&r, pool, 7, OverlapMode::Distinct);
        assert_eq!(ranked.len(), 7);
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.shared_tag_count > b.shared_tag_count
                    || (a.shared_tag_count == b.shared_tag_count && a.item.publish_date >= b.item.publish_date)
            );
        }
    }

    #[test]
    fn overlap_mode_parses() {
        assert_eq!("Literal".parse::<OverlapMode>().unwrap(), OverlapMode::Literal);
        assert_eq!("distinct".parse::<OverlapMode>().unwrap(), OverlapMode::Distinct);
        assert!("fuzzy".parse::<OverlapMode>().is_err());
    }

    #[tokio::test]
    async fn service_reads_from_store() {
        let store = Arc::new(MemoryStore::new());
        let r = blog("r", &["AI", "NLP"], 0);
        let x = blog("x", &["AI", "NLP", "Ethics"], 3);
        let y = blog("y", &["AI"], 1);
        for b in [&r, &x, &y] {
            ContentStore::<Blog>::insert(store.as_ref(), b).await.unwrap();
        }

        let service = RelatedContent::<Blog>::new(store, OverlapMode::Distinct);
        let first = service.related(&r.id.to_string(), 2).await;
        let slugs: Vec<&str> = first.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["x", "y"]);

        // Same store state, same answer
        let second = service.related(&r.id.to_string(), 2).await;
        let again: Vec<&str> = second.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, again);
    }

    #[tokio::test]
    async fn service_unknown_or_malformed_id_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let service = RelatedContent::<CaseStudy>::new(store, OverlapMode::Distinct);
        assert!(service.related(&Uuid::new_v4().to_string(), 4).await.is_empty());
        assert!(service.related("not-a-uuid", 4).await.is_empty());
    }

    #[tokio::test]
    async fn service_fails_soft() {
        let service = RelatedContent::<Blog>::new(Arc::new(FailingStore), OverlapMode::Distinct);
        assert!(service.related(&Uuid::new_v4().to_string(), 3).await.is_empty());
    }

    #[tokio::test]
    async fn candidate_read_failure_is_empty() {
        let reference = case_study("r", &["fintech"]);
        let id = reference.id.to_string();
        let service = RelatedContent::<CaseStudy>::new(Arc::new(FailingPoolStore { reference }), OverlapMode::Distinct);

        assert!(service.related(&id, 4).await.is_empty());
        // Unknown ids return before the candidate read
        assert!(service.related(&Uuid::new_v4().to_string(), 4).await.is_empty());
    }
}
