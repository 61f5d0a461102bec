use std::cmp::Ordering;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier assigned by the tracker site
pub type TorrentId = u32;

/// A promoted torrent seen on the listing page.
///
/// Identity is the `id` alone. Two renders of the same torrent with different
/// titles compare equal.
#[derive(Clone, Debug)]
pub struct Torrent {
    /// Torrent ID
    pub id: TorrentId,
    /// Display title, not unique
    pub name: String,
}

impl Torrent {
    pub fn new(id: TorrentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Download link carrying the account passkey
    pub fn download_link(&self, base_url: &str, passkey: &str) -> String {
        format!("{}/download.php?id={}&passkey={}", base_url, self.id, passkey)
    }
}

impl PartialEq for Torrent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Torrent {}

impl Hash for Torrent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Torrent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Torrent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Torrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Torrent {}: {}]", self.id, self.name)
    }
}

/// Set of torrents keyed by id, iterated in id order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TorrentSet {
    torrents: BTreeMap<TorrentId, Torrent>,
}

impl TorrentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a torrent. An id already present keeps its first record.
    /// Returns false when the id was already present.
    pub fn insert(&mut self, torrent: Torrent) -> bool {
        match self.torrents.entry(torrent.id) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(torrent);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn contains(&self, id: TorrentId) -> bool {
        self.torrents.contains_key(&id)
    }

    pub fn get(&self, id: TorrentId) -> Option<&Torrent> {
        self.torrents.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = TorrentId> + '_ {
        self.torrents.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Torrent> {
        self.torrents.values()
    }

    pub fn len(&self) -> usize {
        self.torrents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.torrents.is_empty()
    }
}

impl FromIterator<Torrent> for TorrentSet {
    fn from_iter<I: IntoIterator<Item = Torrent>>(iter: I) -> Self {
        let mut set = TorrentSet::new();
        for torrent in iter {
            set.insert(torrent);
        }
        set
    }
}

impl IntoIterator for TorrentSet {
    type Item = Torrent;
    type IntoIter = btree_map::IntoValues<TorrentId, Torrent>;

    fn into_iter(self) -> Self::IntoIter {
        self.torrents.into_values()
    }
}
