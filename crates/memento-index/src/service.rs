//! The backing sorted-set service contract.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::IndexResult;

/// One page of a resource's entry set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexPage {
    /// Epoch seconds in ascending order.
    pub entries: Vec<i64>,
    /// Pass back as `after` to read the next page; `None` when exhausted.
    pub next: Option<i64>,
}

/// A key-value service storing one growing set of integers per record.
///
/// Implementations must be thread-safe (`Send + Sync`). `merge` and `remove`
/// are set operations applied atomically per record, so concurrent calls for
/// the same record never lose each other's entries.
#[async_trait]
pub trait IndexService: Send + Sync {
    /// Read the entries of `resource_key` strictly greater than `after`.
    ///
    /// A missing record reads as an empty, exhausted page.
    async fn get(&self, resource_key: &str, after: Option<i64>) -> IndexResult<IndexPage>;

    /// Union `entries` into the record, creating it if needed.
    async fn merge(&self, resource_key: &str, entries: &BTreeSet<i64>) -> IndexResult<()>;

    /// Remove `entries` from the record. Absent entries are ignored.
    async fn remove(&self, resource_key: &str, entries: &BTreeSet<i64>) -> IndexResult<()>;
}

/// Slice an ordered set into a page strictly after `after`.
pub(crate) fn page_of(set: &BTreeSet<i64>, after: Option<i64>, page_size: usize) -> IndexPage {
    let mut tail = match after {
        Some(after) => set.range((std::ops::Bound::Excluded(after), std::ops::Bound::Unbounded)),
        None => set.range(..),
    };
    let entries: Vec<i64> = tail.by_ref().take(page_size).copied().collect();
    let next = match tail.next() {
        Some(_) => entries.last().copied(),
        None => None,
    };
    IndexPage { entries, next }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_of_splits_and_resumes() {
        let set: BTreeSet<i64> = [1, 2, 3, 4, 5].into_iter().collect();
        let first = page_of(&set, None, 2);
        assert_eq!(first.entries, vec![1, 2]);
        assert_eq!(first.next, Some(2));
        let second = page_of(&set, first.next, 2);
        assert_eq!(second.entries, vec![3, 4]);
        let last = page_of(&set, second.next, 2);
        assert_eq!(last.entries, vec![5]);
        assert_eq!(last.next, None);
    }

    #[test]
    fn page_of_empty_set() {
        assert_eq!(page_of(&BTreeSet::new(), None, 10), IndexPage::default());
    }
}
