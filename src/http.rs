//! HTTP Adapter
//!
//! Serves Merkle proofs over HTTP: `GET /txid?<64-hex-display-order>` and a
//! liveness probe at `GET /health`. The index is built once during setup
//! and handed to the router as read-only shared state — see §5 of the
//! governing design notes for why an `Arc` over the finished index is
//! sufficient without further locking.

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::hashutil::DisplayHash;
use crate::index::BlockIndex;
use crate::proof::build_proof;

pub type SharedIndex = Arc<BlockIndex>;

/// Wire shape for a proof response. Field names follow §4.11's HTTP
/// contract, which differs from [`crate::proof::Proof`]'s internal names.
#[derive(Debug, Serialize)]
struct TxidResponse {
    tx_count: u64,
    tx_leaf_index: u64,
    tx_branch_hashes: Vec<String>,
    tx_root_hash: String,
}

async fn handle_txid(State(index): State<SharedIndex>, RawQuery(query): RawQuery) -> impl IntoResponse {
    let Some(hex) = query else {
        return (StatusCode::BAD_REQUEST, "missing txid query").into_response();
    };

    if hex.len() != 64 {
        return (StatusCode::BAD_REQUEST, "txid must be 64 hex characters").into_response();
    }

    let Ok(txid) = DisplayHash::from_hex(&hex) else {
        return (StatusCode::BAD_REQUEST, "txid must be hex-encoded").into_response();
    };

    let proof = build_proof(&index, txid);
    let response = TxidResponse {
        tx_count: proof.tx_count,
        tx_leaf_index: proof.leaf_index,
        tx_branch_hashes: proof.branch.iter().map(|h| h.to_string()).collect(),
        tx_root_hash: proof.merkle_root.to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "btc-spv-proxy",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

pub fn create_router(index: BlockIndex) -> Router {
    let state: SharedIndex = Arc::new(index);

    Router::new()
        .route("/txid", get(handle_txid))
        .route("/health", get(handle_health))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(index: BlockIndex, addr: &str) -> std::io::Result<()> {
    let app = create_router(index);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(target: "btc_spv_proxy::http", %addr, "listening");
    axum::serve(listener, app).await
}
