//! File Discovery
//!
//! Finds `blkNNNNN.dat` files in a data directory, in ascending numeric
//! order, and concatenates them into the byte stream the block indexer
//! walks. Mirrors how a full node lays out its block storage: one growing
//! sequence of numbered files, no sentinel "last file" marker.

use std::fs;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "blk";
const FILE_SUFFIX: &str = ".dat";

/// List `blk*.dat` files under `dir`, sorted by the numeric index in their
/// name rather than lexically (so `blk9.dat` sorts before `blk10.dat`).
/// Files that don't match the `blkNNNNN.dat` pattern are ignored.
pub fn discover_block_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut numbered = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if let Some(index) = parse_block_file_index(name) {
                numbered.push((index, path));
            }
        }
    }
    numbered.sort_by_key(|(index, _)| *index);
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

fn parse_block_file_index(name: &str) -> Option<u32> {
    let middle = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    if middle.is_empty() || !middle.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    middle.parse().ok()
}

/// Read and concatenate every `blk*.dat` file under `dir`, in order.
pub fn load_block_stream(dir: &Path) -> std::io::Result<Vec<u8>> {
    let mut stream = Vec::new();
    for path in discover_block_files(dir)? {
        stream.extend_from_slice(&fs::read(path)?);
    }
    Ok(stream)
}
