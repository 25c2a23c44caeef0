//! Minimal Bitcoin SPV backend
//!
//! Parses raw block files, builds a Merkle-tree-backed block index and a
//! chain-wide header index, and serves Merkle proofs over HTTP so an SPV
//! client can verify a transaction's inclusion and confirmation depth
//! without ever downloading a full block itself.

pub mod block;
pub mod bytes;
pub mod chain;
pub mod config;
pub mod files;
pub mod hashutil;
pub mod headers;
pub mod http;
pub mod index;
pub mod logging;
pub mod merkle;
pub mod proof;
pub mod spv;
