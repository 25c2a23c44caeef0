//! SPV Verifier
//!
//! Verifies a proof tuple against a loaded [`HeaderChain`] and reports a
//! human-readable verdict plus confirmation depth, the way an SPV client
//! that never touched raw block files would: headers and a Merkle branch
//! are all it has.

use crate::chain::HeaderChain;
use crate::hashutil::DisplayHash;
use crate::merkle::verify_branch;
use crate::proof::Proof;

/// Why a proof was rejected, carrying the exact diagnostic text a client
/// would show a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotFound,
    UnknownRoot,
    NotMainChain,
    BranchMismatch,
}

impl RejectReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::NotFound => "Full node proxy could not find transaction",
            RejectReason::UnknownRoot => {
                "SPV client should be synchronized to retrieve latest block headers"
            }
            RejectReason::NotMainChain => "Transaction is not in main chain",
            RejectReason::BranchMismatch => "Transaction cannot be verified",
        }
    }
}

/// The confirmation-depth bucket a confirmed transaction falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    StillReversible,
    SmallAmountLikelySecure,
    LargeAmountLikelySecure,
    CloseToIrreversible,
}

impl Verdict {
    pub fn from_depth(depth: u64) -> Self {
        match depth {
            0 => Verdict::StillReversible,
            1..=5 => Verdict::SmallAmountLikelySecure,
            6..=59 => Verdict::LargeAmountLikelySecure,
            _ => Verdict::CloseToIrreversible,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::StillReversible => "Transaction is still reversible",
            Verdict::SmallAmountLikelySecure => "Small amount transaction is likely secure",
            Verdict::LargeAmountLikelySecure => "Large amount transaction is likely secure",
            Verdict::CloseToIrreversible => "Transaction is close to irreversible",
        }
    }
}

/// Result of verifying one proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Confirmed { depth: u64, verdict: Verdict },
    Rejected(RejectReason),
}

impl VerificationOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            VerificationOutcome::Confirmed { verdict, .. } => verdict.message(),
            VerificationOutcome::Rejected(reason) => reason.message(),
        }
    }

    /// Confirmation depth, or -1 for any rejection, matching the reference
    /// client's signed-depth convention at the CLI/HTTP boundary.
    pub fn depth(&self) -> i64 {
        match self {
            VerificationOutcome::Confirmed { depth, .. } => *depth as i64,
            VerificationOutcome::Rejected(_) => -1,
        }
    }
}

/// Verify `proof` for `txid` (display order) against `chain`.
pub fn verify(chain: &HeaderChain, txid: DisplayHash, proof: &Proof) -> VerificationOutcome {
    let txid = txid.to_internal();

    if proof.tx_count == 0 {
        return VerificationOutcome::Rejected(RejectReason::NotFound);
    }

    let Some(curr) = chain.store().curr_for_merkle_root(&proof.merkle_root) else {
        return VerificationOutcome::Rejected(RejectReason::UnknownRoot);
    };

    if !chain.is_main_chain(&curr) {
        return VerificationOutcome::Rejected(RejectReason::NotMainChain);
    }

    if !verify_branch(
        txid,
        proof.leaf_index,
        proof.tx_count,
        &proof.branch,
        proof.merkle_root,
    ) {
        return VerificationOutcome::Rejected(RejectReason::BranchMismatch);
    }

    let depth = chain.tip_height().saturating_sub(chain.height_of(&curr));
    VerificationOutcome::Confirmed {
        depth,
        verdict: Verdict::from_depth(depth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{decode_block, BLOCK_MAGIC};
    use crate::hashutil::{dsha256, InternalHash, SENTINEL};
    use crate::headers::HeaderStore;
    use crate::index::build_index;
    use crate::proof::build_proof_internal;

    fn synthetic_block(prev_hash: InternalHash, nonce: u32) -> Vec<u8> {
        let mut tx = Vec::new();
        tx.extend_from_slice(&1i32.to_le_bytes());
        tx.push(1);
        tx.extend_from_slice(&[0u8; 32]);
        tx.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        tx.push(0);
        tx.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        tx.push(1);
        tx.extend_from_slice(&5_000_000_000u64.to_le_bytes());
        tx.push(0);
        tx.extend_from_slice(&0u32.to_le_bytes());

        let txid = dsha256(&tx);

        let mut header = Vec::new();
        header.extend_from_slice(&1i32.to_le_bytes());
        header.extend_from_slice(&prev_hash.0);
        header.extend_from_slice(&txid.0);
        header.extend_from_slice(&0u32.to_le_bytes());
        header.extend_from_slice(&0x1d00ffffu32.to_le_bytes());
        header.extend_from_slice(&nonce.to_le_bytes());

        let mut body = Vec::new();
        body.extend_from_slice(&header);
        body.push(1);
        body.extend_from_slice(&tx);

        let mut out = Vec::new();
        out.extend_from_slice(&BLOCK_MAGIC.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    /// A block with two distinct transactions, so its Merkle tree has a
    /// real sibling to tamper with (a single-coinbase block's branch is
    /// always empty).
    fn synthetic_two_tx_block(prev_hash: InternalHash, nonce: u32) -> Vec<u8> {
        let mut txs = Vec::new();
        let mut txids = Vec::new();
        for i in 0..2u32 {
            let mut tx = Vec::new();
            tx.extend_from_slice(&1i32.to_le_bytes());
            tx.push(1);
            tx.extend_from_slice(&[0u8; 32]);
            tx.extend_from_slice(&i.to_le_bytes());
            tx.push(0);
            tx.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes());
            tx.push(1);
            tx.extend_from_slice(&5_000_000_000u64.to_le_bytes());
            tx.push(0);
            tx.extend_from_slice(&0u32.to_le_bytes());
            txids.push(dsha256(&tx));
            txs.push(tx);
        }

        let tree = crate::merkle::MerkleTree::build(&txids);

        let mut header = Vec::new();
        header.extend_from_slice(&1i32.to_le_bytes());
        header.extend_from_slice(&prev_hash.0);
        header.extend_from_slice(&tree.root().0);
        header.extend_from_slice(&0u32.to_le_bytes());
        header.extend_from_slice(&0x1d00ffffu32.to_le_bytes());
        header.extend_from_slice(&nonce.to_le_bytes());

        let mut body = Vec::new();
        body.extend_from_slice(&header);
        body.push(2);
        for tx in &txs {
            body.extend_from_slice(tx);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&BLOCK_MAGIC.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    fn chain_of(blocks: &[Vec<u8>]) -> (crate::chain::HeaderChain, crate::index::BlockIndex) {
        let mut stream = Vec::new();
        for b in blocks {
            stream.extend_from_slice(b);
            stream.extend_from_slice(&[0u8; 4]);
        }
        let (index, header_stream) = build_index(&stream).unwrap();
        let store = HeaderStore::from_stream(&header_stream).unwrap();
        (crate::chain::HeaderChain::build(store), index)
    }

    #[test]
    fn confirms_tx_in_genesis_with_zero_depth() {
        let genesis_bytes = synthetic_block(SENTINEL, 1);
        let (decoded, _) = decode_block(&genesis_bytes, 0).unwrap();
        let (chain, index) = chain_of(&[genesis_bytes]);

        let txid = decoded.transactions[0].txid;
        let proof = build_proof_internal(&index, txid);
        let outcome = verify(&chain, txid.to_display(), &proof);
        assert_eq!(
            outcome,
            VerificationOutcome::Confirmed {
                depth: 0,
                verdict: Verdict::StillReversible
            }
        );
    }

    #[test]
    fn depth_grows_with_confirmations() {
        let genesis_bytes = synthetic_block(SENTINEL, 1);
        let (genesis, _) = decode_block(&genesis_bytes, 0).unwrap();
        let child_bytes = synthetic_block(genesis.block_hash(), 2);

        let (chain, index) = chain_of(&[genesis_bytes, child_bytes]);

        let txid = genesis.transactions[0].txid;
        let proof = build_proof_internal(&index, txid);
        let outcome = verify(&chain, txid.to_display(), &proof);
        assert_eq!(
            outcome,
            VerificationOutcome::Confirmed {
                depth: 1,
                verdict: Verdict::SmallAmountLikelySecure
            }
        );
    }

    #[test]
    fn unknown_txid_rejected_as_not_found() {
        let genesis_bytes = synthetic_block(SENTINEL, 1);
        let (chain, index) = chain_of(&[genesis_bytes]);
        let unknown = InternalHash([0xAA; 32]);
        let proof = build_proof_internal(&index, unknown);
        let outcome = verify(&chain, unknown.to_display(), &proof);
        assert_eq!(outcome, VerificationOutcome::Rejected(RejectReason::NotFound));
    }

    #[test]
    fn side_chain_block_rejected_as_not_main_chain() {
        let genesis_bytes = synthetic_block(SENTINEL, 1);
        let (genesis, _) = decode_block(&genesis_bytes, 0).unwrap();
        let b_bytes = synthetic_block(genesis.block_hash(), 2);
        let b_prime_bytes = synthetic_block(genesis.block_hash(), 3);
        let (b, _) = decode_block(&b_bytes, 0).unwrap();
        let (b_prime, _) = decode_block(&b_prime_bytes, 0).unwrap();
        let c_bytes = synthetic_block(b.block_hash(), 4);

        let (chain, index) = chain_of(&[genesis_bytes, b_bytes, b_prime_bytes, c_bytes]);
        let txid = b_prime.transactions[0].txid;
        let proof = build_proof_internal(&index, txid);
        let outcome = verify(&chain, txid.to_display(), &proof);
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected(RejectReason::NotMainChain)
        );
    }

    #[test]
    fn tampered_merkle_root_rejected_as_unknown_root() {
        let genesis_bytes = synthetic_block(SENTINEL, 1);
        let (decoded, _) = decode_block(&genesis_bytes, 0).unwrap();
        let (chain, index) = chain_of(&[genesis_bytes]);

        let txid = decoded.transactions[0].txid;
        let mut proof = build_proof_internal(&index, txid);
        proof.merkle_root = InternalHash([0xFF; 32]);
        let outcome = verify(&chain, txid.to_display(), &proof);
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected(RejectReason::UnknownRoot)
        );
    }

    #[test]
    fn tampered_branch_rejected() {
        let genesis_bytes = synthetic_two_tx_block(SENTINEL, 1);
        let (genesis, _) = decode_block(&genesis_bytes, 0).unwrap();
        let (chain, index) = chain_of(&[genesis_bytes]);

        let txid = genesis.transactions[0].txid;
        let mut proof = build_proof_internal(&index, txid);
        assert!(!proof.branch.is_empty());
        proof.branch[0].0[0] ^= 0xFF;
        let outcome = verify(&chain, txid.to_display(), &proof);
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected(RejectReason::BranchMismatch)
        );
    }
}
