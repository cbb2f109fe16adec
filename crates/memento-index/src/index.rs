//! The [`VersionIndex`]: timelines and floor lookups over an [`IndexService`].

use std::collections::BTreeSet;
use std::sync::Arc;

use memento_types::{KeyCodec, ResourceId, Timestamp};

use crate::error::{IndexError, IndexResult};
use crate::service::IndexService;

/// Per-resource version timelines.
///
/// Records are addressed by the resource's key namespace (see
/// [`KeyCodec::namespace`]), so the index and the blob store agree on how a
/// resource is named.
#[derive(Clone)]
pub struct VersionIndex {
    service: Arc<dyn IndexService>,
    codec: KeyCodec,
}

impl std::fmt::Debug for VersionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionIndex")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl VersionIndex {
    pub fn new(service: Arc<dyn IndexService>, codec: KeyCodec) -> Self {
        Self { service, codec }
    }

    /// Add `timestamp` to the timeline of `id`. Idempotent.
    pub async fn record(&self, id: &ResourceId, timestamp: Timestamp) -> IndexResult<()> {
        self.record_all(id, std::iter::once(timestamp)).await
    }

    /// Add several timestamps at once.
    pub async fn record_all(
        &self,
        id: &ResourceId,
        timestamps: impl IntoIterator<Item = Timestamp> + Send,
    ) -> IndexResult<()> {
        let entries: BTreeSet<i64> = timestamps.into_iter().map(|t| t.epoch_seconds()).collect();
        if entries.is_empty() {
            return Ok(());
        }
        self.service.merge(&self.codec.namespace(id), &entries).await
    }

    /// Drop `timestamp` from the timeline of `id`. Absent entries are ignored.
    pub async fn remove(&self, id: &ResourceId, timestamp: Timestamp) -> IndexResult<()> {
        let entries = BTreeSet::from([timestamp.epoch_seconds()]);
        self.service.remove(&self.codec.namespace(id), &entries).await
    }

    /// The complete timeline of `id` in ascending order.
    ///
    /// Every page the service hands out is drained. A page that fails to
    /// advance is reported as an error rather than returned as a short
    /// timeline.
    pub async fn timeline(&self, id: &ResourceId) -> IndexResult<Vec<Timestamp>> {
        let key = self.codec.namespace(id);
        let mut timeline: Vec<Timestamp> = Vec::new();
        let mut after: Option<i64> = None;
        loop {
            let page = self.service.get(&key, after).await?;
            for entry in page.entries {
                let ts = Timestamp::from_epoch_seconds(entry);
                if timeline.last().is_some_and(|last| *last >= ts) {
                    return Err(IndexError::IncompleteTimeline {
                        key,
                        reason: format!("entry {entry} out of order"),
                    });
                }
                timeline.push(ts);
            }
            match page.next {
                None => break,
                Some(next) if after.is_some_and(|a| next <= a) => {
                    return Err(IndexError::IncompleteTimeline {
                        key,
                        reason: format!("page cursor did not advance past {next}"),
                    });
                }
                Some(next) => after = Some(next),
            }
        }
        tracing::trace!(resource = %id, versions = timeline.len(), "loaded timeline");
        Ok(timeline)
    }

    /// The latest recorded timestamp not after `at`.
    pub async fn floor(&self, id: &ResourceId, at: Timestamp) -> IndexResult<Option<Timestamp>> {
        let timeline = self.timeline(id).await?;
        Ok(floor_in(&timeline, at))
    }
}

/// Floor lookup over an ascending timeline.
pub fn floor_in(timeline: &[Timestamp], at: Timestamp) -> Option<Timestamp> {
    let idx = timeline.partition_point(|t| *t <= at);
    idx.checked_sub(1).map(|i| timeline[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryIndexService;
    use crate::service::IndexPage;
    use async_trait::async_trait;
    use proptest::prelude::*;

    fn ts(s: i64) -> Timestamp {
        Timestamp::from_epoch_seconds(s)
    }

    fn rid(s: &str) -> ResourceId {
        ResourceId::new(s).unwrap()
    }

    fn index_with_page_size(page_size: usize) -> VersionIndex {
        VersionIndex::new(Arc::new(InMemoryIndexService::with_page_size(page_size)), KeyCodec::default())
    }

    #[tokio::test]
    async fn empty_timeline() {
        let index = index_with_page_size(10);
        assert!(index.timeline(&rid("res1")).await.unwrap().is_empty());
        assert_eq!(index.floor(&rid("res1"), ts(100)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn record_is_idempotent() {
        let index = index_with_page_size(10);
        index.record(&rid("res1"), ts(100)).await.unwrap();
        index.record(&rid("res1"), ts(100)).await.unwrap();
        assert_eq!(index.timeline(&rid("res1")).await.unwrap(), vec![ts(100)]);
    }

    #[tokio::test]
    async fn out_of_order_records_sort() {
        let index = index_with_page_size(10);
        for t in [300, 100, 200] {
            index.record(&rid("res1"), ts(t)).await.unwrap();
        }
        assert_eq!(index.timeline(&rid("res1")).await.unwrap(), vec![ts(100), ts(200), ts(300)]);
    }

    #[tokio::test]
    async fn timeline_drains_every_page() {
        let index = index_with_page_size(3);
        index.record_all(&rid("res1"), (1..=10).map(ts)).await.unwrap();
        let timeline = index.timeline(&rid("res1")).await.unwrap();
        assert_eq!(timeline.len(), 10);
        assert_eq!(timeline.first(), Some(&ts(1)));
        assert_eq!(timeline.last(), Some(&ts(10)));
    }

    #[tokio::test]
    async fn prefixed_and_bare_identifiers_keep_separate_timelines() {
        let index = index_with_page_size(10);
        index.record(&rid("res1"), ts(100)).await.unwrap();
        index.record(&rid("trellis:data/res1"), ts(200)).await.unwrap();
        assert_eq!(index.timeline(&rid("res1")).await.unwrap(), vec![ts(100)]);
        assert_eq!(index.timeline(&rid("trellis:data/res1")).await.unwrap(), vec![ts(200)]);
    }

    #[tokio::test]
    async fn floor_lookups() {
        let index = index_with_page_size(10);
        index.record_all(&rid("res1"), [ts(100), ts(200)]).await.unwrap();
        let id = rid("res1");
        assert_eq!(index.floor(&id, ts(99)).await.unwrap(), None);
        assert_eq!(index.floor(&id, ts(100)).await.unwrap(), Some(ts(100)));
        assert_eq!(index.floor(&id, ts(150)).await.unwrap(), Some(ts(100)));
        assert_eq!(index.floor(&id, ts(200)).await.unwrap(), Some(ts(200)));
        assert_eq!(index.floor(&id, ts(10_000)).await.unwrap(), Some(ts(200)));
    }

    #[tokio::test]
    async fn remove_entry() {
        let index = index_with_page_size(10);
        index.record_all(&rid("res1"), [ts(100), ts(200)]).await.unwrap();
        index.remove(&rid("res1"), ts(200)).await.unwrap();
        assert_eq!(index.floor(&rid("res1"), ts(250)).await.unwrap(), Some(ts(100)));
    }

    #[tokio::test]
    async fn concurrent_records_for_one_resource() {
        let index = index_with_page_size(7);
        let mut handles = Vec::new();
        for t in 0..50 {
            let index = index.clone();
            handles.push(tokio::spawn(async move { index.record(&rid("res1"), ts(t)).await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(index.timeline(&rid("res1")).await.unwrap().len(), 50);
    }

    /// Hands out the same page forever.
    struct StuckService;

    #[async_trait]
    impl IndexService for StuckService {
        async fn get(&self, _key: &str, _after: Option<i64>) -> IndexResult<IndexPage> {
            Ok(IndexPage {
                entries: vec![],
                next: Some(1),
            })
        }
        async fn merge(&self, _key: &str, _entries: &BTreeSet<i64>) -> IndexResult<()> {
            Ok(())
        }
        async fn remove(&self, _key: &str, _entries: &BTreeSet<i64>) -> IndexResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn stuck_pagination_is_an_error_not_a_short_timeline() {
        let index = VersionIndex::new(Arc::new(StuckService), KeyCodec::default());
        assert!(matches!(
            index.timeline(&rid("res1")).await,
            Err(IndexError::IncompleteTimeline { .. })
        ));
    }

    proptest! {
        #[test]
        fn floor_in_matches_linear_scan(entries in proptest::collection::btree_set(-1000i64..1000, 0..40), at in -1100i64..1100) {
            let timeline: Vec<Timestamp> = entries.into_iter().map(ts).collect();
            let expected = timeline.iter().copied().filter(|t| *t <= ts(at)).max();
            prop_assert_eq!(floor_in(&timeline, ts(at)), expected);
        }
    }
}
