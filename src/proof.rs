//! Proof Adapter
//!
//! Turns a display-order txid into the Merkle proof tuple an SPV client
//! needs: the block's transaction count, the transaction's leaf index, its
//! sibling branch, and the block's Merkle root. All internal-order; display
//! order never leaves the HTTP/CLI boundary.

use serde::{Deserialize, Serialize};

use crate::hashutil::{DisplayHash, InternalHash};
use crate::index::BlockIndex;

/// A proof tuple as returned to an SPV client. `tx_count == 0` is the
/// "not found" sentinel: an unknown txid is encoded as data, never an
/// error, matching the query path's lenient error policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Proof {
    pub tx_count: u64,
    pub leaf_index: u64,
    pub branch: Vec<InternalHash>,
    pub merkle_root: InternalHash,
}

impl Proof {
    pub fn not_found() -> Self {
        Self {
            tx_count: 0,
            leaf_index: 0,
            branch: Vec::new(),
            merkle_root: InternalHash([0u8; 32]),
        }
    }

    pub fn is_found(&self) -> bool {
        self.tx_count != 0
    }
}

/// Look up `txid` (given in display order, as it arrives over HTTP or the
/// CLI) and build its proof tuple, or the not-found sentinel.
pub fn build_proof(index: &BlockIndex, txid: DisplayHash) -> Proof {
    let txid = txid.to_internal();
    build_proof_internal(index, txid)
}

/// Same as [`build_proof`] but for a txid already in internal order.
pub fn build_proof_internal(index: &BlockIndex, txid: InternalHash) -> Proof {
    let Some((block_hash, leaf_index)) = index.locate(&txid) else {
        return Proof::not_found();
    };
    let block = index
        .block(&block_hash)
        .expect("a located transaction's block must be indexed");

    Proof {
        tx_count: block.merkle_tree.tx_count(),
        leaf_index: leaf_index as u64,
        branch: block.merkle_tree.branch(leaf_index),
        merkle_root: block.header.merkle_root,
    }
}
