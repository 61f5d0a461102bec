use crate::models::torrent::TorrentSet;

/// Result of comparing a fresh snapshot against the tracked set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    /// Torrents in the snapshot whose id is not tracked yet
    pub delta: TorrentSet,
    /// Replacement for the tracked set, always the full snapshot
    pub next: TorrentSet,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.delta.is_empty()
    }
}

/// Compute `current - previous` by id.
///
/// Ids that disappeared from `current` produce nothing; they only fall out of
/// `next`.
pub fn diff(previous: &TorrentSet, current: TorrentSet) -> Diff {
    let delta = current
        .iter()
        .filter(|torrent| !previous.contains(torrent.id))
        .cloned()
        .collect();

    Diff {
        delta,
        next: current,
    }
}

/// Torrents promoted as of the last successful poll.
///
/// Owned by the poll loop. The only mutation is a wholesale [`replace`].
///
/// [`replace`]: TrackedSet::replace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedSet {
    torrents: TorrentSet,
}

impl TrackedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn torrents(&self) -> &TorrentSet {
        &self.torrents
    }

    pub fn diff(&self, current: TorrentSet) -> Diff {
        diff(&self.torrents, current)
    }

    pub fn replace(&mut self, next: TorrentSet) {
        self.torrents = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::torrent::Torrent;

    fn set(ids: &[u32]) -> TorrentSet {
        ids.iter()
            .map(|&id| Torrent::new(id, format!("torrent {}", id)))
            .collect()
    }

    fn ids(set: &TorrentSet) -> Vec<u32> {
        set.ids().collect()
    }

    #[test]
    fn test_new_item_is_delta() {
        let result = diff(&set(&[1, 2, 3]), set(&[1, 2, 3, 4]));

        assert_eq!(ids(&result.delta), vec![4]);
        assert_eq!(ids(&result.next), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_identical_snapshots_have_empty_delta() {
        let result = diff(&set(&[1, 2]), set(&[1, 2]));
        assert!(result.is_empty());
    }

    #[test]
    fn test_removed_items_never_surface() {
        let result = diff(&set(&[1, 2, 3]), set(&[2, 5]));

        assert_eq!(ids(&result.delta), vec![5]);
        assert_eq!(ids(&result.next), vec![2, 5]);
    }

    #[test]
    fn test_empty_previous_reports_everything() {
        let result = diff(&TorrentSet::new(), set(&[7, 8]));
        assert_eq!(ids(&result.delta), vec![7, 8]);
    }

    #[test]
    fn test_renamed_item_is_not_new() {
        let previous: TorrentSet = [Torrent::new(42, "old title")].into_iter().collect();
        let current: TorrentSet = [Torrent::new(42, "new title")].into_iter().collect();

        let result = diff(&previous, current);

        assert!(result.is_empty());
        assert_eq!(result.next.get(42).unwrap().name, "new title");
    }

    #[test]
    fn test_delta_laws() {
        let cases = [
            (vec![], vec![1, 2]),
            (vec![1, 2, 3], vec![3, 4]),
            (vec![5], vec![]),
            (vec![1, 2], vec![2, 1]),
            (vec![10, 20, 30], vec![5, 20, 40]),
        ];

        for (previous, current) in cases {
            let previous = set(&previous);
            let current = set(&current);
            let result = diff(&previous, current.clone());

            for torrent in result.delta.iter() {
                assert!(current.contains(torrent.id), "delta must be a subset of current");
                assert!(!previous.contains(torrent.id), "delta must not contain tracked ids");
            }
            assert_eq!(result.next, current);
            assert_eq!(diff(&previous, current.clone()), result);
        }
    }

    #[test]
    fn test_reappearance_is_new_again() {
        let mut tracked = TrackedSet::new();

        let first = tracked.diff(set(&[42]));
        assert_eq!(ids(&first.delta), vec![42]);
        tracked.replace(first.next);

        let gone = tracked.diff(set(&[]));
        assert!(gone.is_empty());
        tracked.replace(gone.next);
        assert!(tracked.torrents().is_empty());

        let back = tracked.diff(set(&[42]));
        assert_eq!(ids(&back.delta), vec![42]);
    }
}
