//! Block Decoder
//!
//! Parses one raw block (80-byte header, transaction count, transactions)
//! out of a byte buffer, the legacy pre-SegWit layout only.

use thiserror::Error;

use crate::bytes::{ByteReader, ReadError};
use crate::hashutil::{dsha256, InternalHash};
use crate::merkle::MerkleTree;

/// Raw bytes on disk are `F9 BE B4 D9`; as a little-endian u32 they read as
/// this value.
pub const BLOCK_MAGIC: u32 = 0xD9B4BEF9;

#[derive(Debug, Error)]
pub enum BlockDecodeError {
    #[error(transparent)]
    Truncated(#[from] ReadError),

    #[error("bad magic at offset {offset}: got {got:#010x}, want {BLOCK_MAGIC:#010x}")]
    BadMagic { offset: usize, got: u32 },

    #[error("block size mismatch: header declared {declared}, parsed {parsed}")]
    BlockSizeMismatch { declared: u32, parsed: u32 },

    #[error("merkle root mismatch: header has {header}, computed {computed}")]
    MerkleRootMismatch {
        header: InternalHash,
        computed: InternalHash,
    },
}

/// An 80-byte Bitcoin block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: i32,
    pub prev_hash: InternalHash,
    pub merkle_root: InternalHash,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

pub const HEADER_SIZE: usize = 80;

impl Header {
    pub fn to_raw(&self) -> [u8; HEADER_SIZE] {
        let mut raw = [0u8; HEADER_SIZE];
        raw[0..4].copy_from_slice(&self.version.to_le_bytes());
        raw[4..36].copy_from_slice(&self.prev_hash.0);
        raw[36..68].copy_from_slice(&self.merkle_root.0);
        raw[68..72].copy_from_slice(&self.time.to_le_bytes());
        raw[72..76].copy_from_slice(&self.bits.to_le_bytes());
        raw[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        raw
    }

    pub fn from_raw(raw: &[u8; HEADER_SIZE]) -> Self {
        Self {
            version: i32::from_le_bytes(raw[0..4].try_into().unwrap()),
            prev_hash: InternalHash::from_slice(&raw[4..36]),
            merkle_root: InternalHash::from_slice(&raw[36..68]),
            time: u32::from_le_bytes(raw[68..72].try_into().unwrap()),
            bits: u32::from_le_bytes(raw[72..76].try_into().unwrap()),
            nonce: u32::from_le_bytes(raw[76..80].try_into().unwrap()),
        }
    }

    /// Double-SHA-256 of the raw 80-byte header, the block's identifier.
    pub fn hash(&self) -> InternalHash {
        dsha256(&self.to_raw())
    }
}

#[derive(Debug, Clone)]
pub struct TxInput {
    pub prev_tx_hash: InternalHash,
    pub prev_tx_index: u32,
    pub script: Vec<u8>,
    pub sequence: u32,
}

#[derive(Debug, Clone)]
pub struct TxOutput {
    pub amount_satoshi: u64,
    pub script: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub locktime: u32,
    pub txid: InternalHash,
}

/// Everything the decoder produced for one block. Callers that only need to
/// index the chain typically discard `transactions` right away, keeping just
/// `header` and `merkle_tree` (see [`crate::index::BlockIndex`]).
#[derive(Debug, Clone)]
pub struct DecodedBlock {
    pub header: Header,
    pub transactions: Vec<Transaction>,
    pub merkle_tree: MerkleTree,
}

impl DecodedBlock {
    pub fn block_hash(&self) -> InternalHash {
        self.header.hash()
    }
}

/// Parse one transaction starting at `reader`'s current position, returning
/// it along with the exact raw bytes it occupied (needed because the txid
/// hashes those bytes verbatim, not a re-serialization).
fn decode_transaction<'a>(
    data: &'a [u8],
    start: usize,
) -> Result<(Transaction, usize), BlockDecodeError> {
    let mut reader = ByteReader::at(data, start);

    let version = reader.read_i32_le()?;

    let (input_count, _) = reader.read_varint()?;
    let mut inputs = Vec::with_capacity(input_count as usize);
    for _ in 0..input_count {
        let prev_tx_hash = reader.read_hash_internal()?;
        let prev_tx_index = reader.read_u32_le()?;
        let (script_len, _) = reader.read_varint()?;
        let script = reader.read_bytes(script_len as usize)?.to_vec();
        let sequence = reader.read_u32_le()?;
        inputs.push(TxInput {
            prev_tx_hash,
            prev_tx_index,
            script,
            sequence,
        });
    }

    let (output_count, _) = reader.read_varint()?;
    let mut outputs = Vec::with_capacity(output_count as usize);
    for _ in 0..output_count {
        let amount_satoshi = reader.read_u64_le()?;
        let (script_len, _) = reader.read_varint()?;
        let script = reader.read_bytes(script_len as usize)?.to_vec();
        outputs.push(TxOutput {
            amount_satoshi,
            script,
        });
    }

    let locktime = reader.read_u32_le()?;

    let end = reader.position();
    let raw = &data[start..end];
    let txid = dsha256(raw);

    Ok((
        Transaction {
            version,
            inputs,
            outputs,
            locktime,
            txid,
        },
        end,
    ))
}

/// Decode one block at `offset`. Returns the block and the number of bytes
/// it occupied, counting the magic, the size field, and the block body —
/// NOT the non-standard inter-block padding a caller walking a raw block
/// file must additionally skip (see the file-discovery adapter).
pub fn decode_block(data: &[u8], offset: usize) -> Result<(DecodedBlock, usize), BlockDecodeError> {
    let mut reader = ByteReader::at(data, offset);

    let magic = reader.read_u32_le()?;
    if magic != BLOCK_MAGIC {
        return Err(BlockDecodeError::BadMagic { offset, got: magic });
    }

    let block_size = reader.read_u32_le()?;
    let block_start = reader.position();

    let header_raw: [u8; HEADER_SIZE] = reader.read_bytes(HEADER_SIZE)?.try_into().unwrap();
    let header = Header::from_raw(&header_raw);

    let (tx_count, _) = reader.read_varint()?;

    let mut transactions = Vec::with_capacity(tx_count as usize);
    let mut txids = Vec::with_capacity(tx_count as usize);
    let mut cursor = reader.position();
    for _ in 0..tx_count {
        let (tx, next) = decode_transaction(data, cursor)?;
        txids.push(tx.txid);
        transactions.push(tx);
        cursor = next;
    }

    let parsed_size = (cursor - block_start) as u32;
    if parsed_size != block_size {
        return Err(BlockDecodeError::BlockSizeMismatch {
            declared: block_size,
            parsed: parsed_size,
        });
    }

    let merkle_tree = MerkleTree::build(&txids);
    if merkle_tree.root() != header.merkle_root {
        return Err(BlockDecodeError::MerkleRootMismatch {
            header: header.merkle_root,
            computed: merkle_tree.root(),
        });
    }

    let consumed = cursor - offset;
    Ok((
        DecodedBlock {
            header,
            transactions,
            merkle_tree,
        },
        consumed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashutil::SENTINEL;

    /// Build the raw byte stream for a single-coinbase block: one input
    /// (coinbase, no real prevout) and one output, legacy encoding.
    fn synthetic_block_bytes(prev_hash: InternalHash, nonce: u32) -> Vec<u8> {
        let mut tx = Vec::new();
        tx.extend_from_slice(&1i32.to_le_bytes()); // version
        tx.push(1); // input count
        tx.extend_from_slice(&[0u8; 32]); // prev_tx_hash (coinbase null)
        tx.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes()); // prev_tx_index
        tx.push(0); // script len
        tx.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes()); // sequence
        tx.push(1); // output count
        tx.extend_from_slice(&5_000_000_000u64.to_le_bytes()); // amount
        tx.push(0); // script len
        tx.extend_from_slice(&0u32.to_le_bytes()); // locktime

        let txid = dsha256(&tx);
        let merkle_root = txid;

        let mut header = Vec::new();
        header.extend_from_slice(&1i32.to_le_bytes());
        header.extend_from_slice(&prev_hash.0);
        header.extend_from_slice(&merkle_root.0);
        header.extend_from_slice(&0u32.to_le_bytes());
        header.extend_from_slice(&0x1d00ffffu32.to_le_bytes());
        header.extend_from_slice(&nonce.to_le_bytes());

        let mut body = Vec::new();
        body.extend_from_slice(&header);
        body.push(1); // tx_count
        body.extend_from_slice(&tx);

        let mut out = Vec::new();
        out.extend_from_slice(&BLOCK_MAGIC.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn decodes_single_coinbase_block() {
        let bytes = synthetic_block_bytes(SENTINEL, 42);
        let (block, consumed) = decode_block(&bytes, 0).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.merkle_tree.root(), block.header.merkle_root);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = synthetic_block_bytes(SENTINEL, 1);
        bytes[0] ^= 0xFF;
        assert!(matches!(
            decode_block(&bytes, 0),
            Err(BlockDecodeError::BadMagic { .. })
        ));
    }

    #[test]
    fn rejects_truncated_block() {
        let bytes = synthetic_block_bytes(SENTINEL, 1);
        let truncated = &bytes[..bytes.len() - 10];
        assert!(decode_block(truncated, 0).is_err());
    }

    #[test]
    fn rejects_merkle_root_mismatch() {
        let mut bytes = synthetic_block_bytes(SENTINEL, 1);
        // corrupt a header byte inside the merkle root field (offset 8 + 4 + 32)
        bytes[8 + 4 + 32] ^= 0xFF;
        assert!(matches!(
            decode_block(&bytes, 0),
            Err(BlockDecodeError::MerkleRootMismatch { .. })
        ));
    }

    #[test]
    fn header_raw_roundtrip() {
        let header = Header {
            version: 1,
            prev_hash: SENTINEL,
            merkle_root: InternalHash([7u8; 32]),
            time: 1_234_567,
            bits: 0x1d00ffff,
            nonce: 999,
        };
        let raw = header.to_raw();
        assert_eq!(Header::from_raw(&raw), header);
    }
}
