//! Header Store
//!
//! Parses a flat stream of concatenated 80-byte headers (the output of the
//! block decoder's side channel, or a file handed directly to an SPV client
//! that never touches raw block files) and maintains the four lookup maps
//! the chain indexer needs: prev -> children, curr -> prev, curr -> header,
//! merkle root -> curr.

use std::collections::HashMap;

use crate::block::{Header, HEADER_SIZE};
use crate::bytes::{ByteReader, ReadError};
use crate::hashutil::InternalHash;

/// All headers known to this process, indexed every way the chain indexer
/// and the SPV verifier need. Keyed uniformly by internal-order hash,
/// including the genesis header (whose `prev_hash` is the all-zero
/// sentinel, not a special case distinct from any other header).
#[derive(Debug, Default, Clone)]
pub struct HeaderStore {
    curr_to_header: HashMap<InternalHash, Header>,
    curr_to_prev: HashMap<InternalHash, InternalHash>,
    /// Insertion-ordered per key, so BFS tie-breaking among equal-distance
    /// tips depends only on parse order (see chain::HeaderChain).
    prev_to_children: HashMap<InternalHash, Vec<InternalHash>>,
    merkle_root_to_curr: HashMap<InternalHash, InternalHash>,
}

impl HeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a concatenation of raw 80-byte headers, one record per header,
    /// no framing. A trailing partial record is a truncated read.
    pub fn from_stream(data: &[u8]) -> Result<Self, ReadError> {
        let mut store = Self::new();
        let mut reader = ByteReader::new(data);
        while reader.remaining() > 0 {
            let raw: [u8; HEADER_SIZE] = reader.read_bytes(HEADER_SIZE)?.try_into().unwrap();
            store.insert(Header::from_raw(&raw));
        }
        Ok(store)
    }

    pub fn insert(&mut self, header: Header) {
        let curr = header.hash();
        self.prev_to_children
            .entry(header.prev_hash)
            .or_default()
            .push(curr);
        self.curr_to_prev.insert(curr, header.prev_hash);
        self.merkle_root_to_curr.insert(header.merkle_root, curr);
        self.curr_to_header.insert(curr, header);
    }

    pub fn header(&self, hash: &InternalHash) -> Option<&Header> {
        self.curr_to_header.get(hash)
    }

    pub fn prev_of(&self, hash: &InternalHash) -> Option<InternalHash> {
        self.curr_to_prev.get(hash).copied()
    }

    /// Children of `hash`, in the order their headers were parsed. Empty
    /// slice for a hash with no known children (a tip, or an unknown hash).
    pub fn children_of(&self, hash: &InternalHash) -> &[InternalHash] {
        self.prev_to_children
            .get(hash)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn curr_for_merkle_root(&self, root: &InternalHash) -> Option<InternalHash> {
        self.merkle_root_to_curr.get(root).copied()
    }

    pub fn len(&self) -> usize {
        self.curr_to_header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curr_to_header.is_empty()
    }
}
