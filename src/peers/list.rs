//! Peer List
//!
//! The manager's current set of peer addresses, replaced wholesale on each
//! discovery tick.

use parking_lot::RwLock;

// == Peer Diff ==
/// Membership change between two peer sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerDiff {
    /// Present now, absent before
    pub added: Vec<String>,
    /// Present before, absent now
    pub removed: Vec<String>,
}

impl PeerDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Computes which peers joined and left between `previous` and `current`.
pub fn diff_peers(previous: &[String], current: &[String]) -> PeerDiff {
    PeerDiff {
        added: current
            .iter()
            .filter(|peer| !previous.contains(peer))
            .cloned()
            .collect(),
        removed: previous
            .iter()
            .filter(|peer| !current.contains(peer))
            .cloned()
            .collect(),
    }
}

// == Peer List ==
#[derive(Debug, Default)]
pub struct PeerList {
    addrs: RwLock<Vec<String>>,
}

impl PeerList {
    pub fn new(addrs: Vec<String>) -> Self {
        Self {
            addrs: RwLock::new(addrs),
        }
    }

    /// Copy of the current peers.
    pub fn snapshot(&self) -> Vec<String> {
        self.addrs.read().clone()
    }

    /// Replaces the peer set and returns what changed, atomically.
    pub fn replace(&self, current: Vec<String>) -> PeerDiff {
        let mut addrs = self.addrs.write();
        let diff = diff_peers(&addrs, &current);
        *addrs = current;
        diff
    }

    pub fn len(&self) -> usize {
        self.addrs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.read().is_empty()
    }
}
