//! Chain Indexer
//!
//! Builds heights and the main-chain flag over a [`HeaderStore`] by running
//! one breadth-first traversal from the genesis predecessor (the all-zero
//! sentinel) and then walking the winning tip back to genesis.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::hashutil::{InternalHash, SENTINEL};
use crate::headers::HeaderStore;

/// A [`HeaderStore`] plus the derived height/main-chain view over it.
/// Immutable once built; the chain indexer runs exactly once in setup.
#[derive(Debug)]
pub struct HeaderChain {
    store: HeaderStore,
    heights: HashMap<InternalHash, u64>,
    main_chain: HashSet<InternalHash>,
    tip: InternalHash,
    tip_height: u64,
}

impl HeaderChain {
    /// Run the BFS and main-chain flagging once, consuming the store.
    pub fn build(store: HeaderStore) -> Self {
        let (heights, tip, tip_height) = bfs_heights(&store);
        let main_chain = flag_main_chain(&store, tip);

        Self {
            store,
            heights,
            main_chain,
            tip,
            tip_height,
        }
    }

    pub fn store(&self) -> &HeaderStore {
        &self.store
    }

    /// Height of `hash`, or 0 if it was never reached from genesis (an
    /// orphan sub-tree never gets an assigned height).
    pub fn height_of(&self, hash: &InternalHash) -> u64 {
        self.heights.get(hash).copied().unwrap_or(0)
    }

    pub fn is_main_chain(&self, hash: &InternalHash) -> bool {
        self.main_chain.contains(hash)
    }

    pub fn tip(&self) -> InternalHash {
        self.tip
    }

    pub fn tip_height(&self) -> u64 {
        self.tip_height
    }
}

/// BFS from the sentinel, returning per-hash heights and the winning tip.
/// Among equal-distance tips, the first one BFS discovers wins: iteration
/// order follows [`HeaderStore::children_of`], which preserves parse order,
/// so the result is deterministic for a given header stream (see O4).
fn bfs_heights(store: &HeaderStore) -> (HashMap<InternalHash, u64>, InternalHash, u64) {
    let mut distances = HashMap::new();
    distances.insert(SENTINEL, 0u64);
    let mut heights = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(SENTINEL);

    let mut max_distance = 0u64;
    let mut max_hash = SENTINEL;

    while let Some(curr) = queue.pop_front() {
        let curr_distance = distances[&curr];
        for &child in store.children_of(&curr) {
            if distances.contains_key(&child) {
                continue;
            }
            let distance = curr_distance + 1;
            distances.insert(child, distance);
            heights.insert(child, distance - 1);
            queue.push_back(child);

            if distance > max_distance {
                max_distance = distance;
                max_hash = child;
            }
        }
    }

    let tip_height = max_distance.saturating_sub(1);
    (heights, max_hash, tip_height)
}

/// Walk from `tip` back to the sentinel, flagging every header on the path,
/// then flag the genesis header itself (the sentinel's sole child).
fn flag_main_chain(store: &HeaderStore, tip: InternalHash) -> HashSet<InternalHash> {
    let mut main_chain = HashSet::new();
    if tip == SENTINEL {
        return main_chain;
    }

    let mut curr = tip;
    loop {
        main_chain.insert(curr);
        match store.prev_of(&curr) {
            Some(prev) if prev != SENTINEL => curr = prev,
            _ => break,
        }
    }

    if let Some(&genesis) = store.children_of(&SENTINEL).first() {
        main_chain.insert(genesis);
    }

    main_chain
}
