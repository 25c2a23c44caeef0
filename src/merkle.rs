//! Merkle Tree Engine
//!
//! Bottom-up tree construction with odd-level duplication, branch extraction
//! for a known leaf, and branch verification for an SPV client that only
//! has a leaf, a claimed root, and a leaf count (not the tree itself).

use crate::hashutil::{dsha256_pair, InternalHash};

/// A Merkle tree as the ordered list of its levels, leaves first, root last.
/// Every non-root level has even length; an odd level is stored already
/// padded with a duplicate of its final element.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<InternalHash>>,
    leaf_count: u64,
}

impl MerkleTree {
    /// Build a tree from an ordered list of leaf hashes (txids in block order,
    /// leaf 0 being the coinbase). A single leaf yields a one-level tree whose
    /// root is that leaf.
    pub fn build(leaves: &[InternalHash]) -> Self {
        assert!(!leaves.is_empty(), "a block always has at least a coinbase");

        let leaf_count = leaves.len() as u64;
        let mut levels = Vec::new();
        let mut children = leaves.to_vec();

        while children.len() > 1 {
            if children.len() % 2 == 1 {
                let last = *children.last().unwrap();
                children.push(last);
            }
            levels.push(children.clone());

            let mut parents = Vec::with_capacity(children.len() / 2);
            for pair in children.chunks_exact(2) {
                parents.push(dsha256_pair(&pair[0], &pair[1]));
            }
            children = parents;
        }
        levels.push(children);
        Self { levels, leaf_count }
    }

    pub fn root(&self) -> InternalHash {
        self.levels.last().unwrap()[0]
    }

    /// True number of transactions, before any odd-level padding — the
    /// count the original's `get_tx_count_int` reports, not the padded
    /// leaf level's length.
    pub fn tx_count(&self) -> u64 {
        self.leaf_count
    }

    /// Sibling hashes for `leaf_index`, from the leaf level up to (excluding)
    /// the root. Empty for a single-leaf tree.
    pub fn branch(&self, leaf_index: usize) -> Vec<InternalHash> {
        if self.levels.len() == 1 {
            return Vec::new();
        }

        let mut branch = Vec::with_capacity(self.levels.len() - 1);
        let mut idx = leaf_index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_idx = idx ^ 1;
            branch.push(level[sibling_idx]);
            idx /= 2;
        }
        branch
    }
}

/// Verify a Merkle branch against a claimed root, the way an SPV client
/// must: from only `tx_count` and `leaf_index`, without the tree itself.
/// `tx_count` drives the even-padding of each level's effective size, which
/// in turn decides nothing about the branch hashes themselves but must stay
/// consistent with how `MerkleTree::build` padded the same levels.
pub fn verify_branch(
    leaf: InternalHash,
    leaf_index: u64,
    tx_count: u64,
    branch: &[InternalHash],
    claimed_root: InternalHash,
) -> bool {
    if tx_count == 0 {
        return false;
    }
    if tx_count == 1 {
        return branch.is_empty() && leaf == claimed_root;
    }

    let mut hash = leaf;
    let mut level_count = tx_count;
    let mut idx = leaf_index;

    for sibling in branch {
        if level_count % 2 == 1 {
            level_count += 1;
        }
        hash = if idx % 2 == 0 {
            dsha256_pair(&hash, sibling)
        } else {
            dsha256_pair(sibling, &hash)
        };
        level_count /= 2;
        idx /= 2;
    }

    hash == claimed_root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashutil::dsha256;

    fn leaf(n: u8) -> InternalHash {
        dsha256(&[n])
    }

    #[test]
    fn single_leaf_tree_has_no_branch() {
        let tree = MerkleTree::build(&[leaf(0)]);
        assert_eq!(tree.root(), leaf(0));
        assert!(tree.branch(0).is_empty());
        assert!(verify_branch(leaf(0), 0, 1, &[], tree.root()));
    }

    #[test]
    fn two_leaf_tree_branches_verify() {
        let leaves = vec![leaf(0), leaf(1)];
        let tree = MerkleTree::build(&leaves);
        for (i, l) in leaves.iter().enumerate() {
            let branch = tree.branch(i);
            assert!(verify_branch(*l, i as u64, 2, &branch, tree.root()));
        }
    }

    #[test]
    fn odd_leaf_count_duplicates_last_leaf() {
        let leaves = vec![leaf(0), leaf(1), leaf(2)];
        let tree = MerkleTree::build(&leaves);
        assert_eq!(tree.tx_count(), 3);
        for (i, l) in leaves.iter().enumerate() {
            let branch = tree.branch(i);
            assert!(
                verify_branch(*l, i as u64, 3, &branch, tree.root()),
                "leaf {i} failed to verify"
            );
        }
    }

    #[test]
    fn tampered_branch_fails_verification() {
        let leaves = vec![leaf(0), leaf(1), leaf(2), leaf(3)];
        let tree = MerkleTree::build(&leaves);
        let mut branch = tree.branch(1);
        branch[0] = dsha256(b"not a sibling");
        assert!(!verify_branch(leaves[1], 1, 4, &branch, tree.root()));
    }

    #[test]
    fn tampered_root_fails_verification() {
        let leaves = vec![leaf(0), leaf(1)];
        let tree = MerkleTree::build(&leaves);
        let branch = tree.branch(0);
        assert!(!verify_branch(leaves[0], 0, 2, &branch, dsha256(b"wrong root")));
    }
}
