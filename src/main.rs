//! Minimal Bitcoin SPV proxy — CLI entry point
//!
//! Run modes:
//!   btc-spv-proxy index <blocks-dir> [--port <port>]
//!   btc-spv-proxy headers <header-file>
//!   btc-spv-proxy verify <header-file> <txid-hex> <tx_count> <leaf_index> <root-hex> <branch-hex...>
//!   btc-spv-proxy help

use std::env;
use std::path::Path;
use std::process::ExitCode;

use btc_spv_proxy::chain::HeaderChain;
use btc_spv_proxy::config::Config;
use btc_spv_proxy::hashutil::DisplayHash;
use btc_spv_proxy::headers::HeaderStore;
use btc_spv_proxy::index::build_index;
use btc_spv_proxy::logging::init_from_config;
use btc_spv_proxy::proof::Proof;
use btc_spv_proxy::spv::verify;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_from_config(&config) {
        eprintln!("logging init failed: {e}");
    }

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    match args[1].as_str() {
        "index" => run_index(&args[2..], config).await,
        "headers" => run_headers(&args[2..]),
        "verify" => run_verify(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("unknown subcommand: {other}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!("btc-spv-proxy - minimal Bitcoin SPV full-node proxy");
    println!();
    println!("Usage:");
    println!("  btc-spv-proxy index <blocks-dir> [--port <port>]   Build the block index, serve proofs over HTTP");
    println!("  btc-spv-proxy headers <header-file>                 Print chain height/tip/main-chain summary");
    println!(
        "  btc-spv-proxy verify <header-file> <txid> <tx_count> <leaf_index> <root> <branch...>"
    );
    println!("                                                       Verify a manually supplied proof tuple");
    println!();
    println!("Environment Variables:");
    println!("  BTC_SPV_DATA_DIR       Blocks directory (overridden by the index subcommand's argument)");
    println!("  BTC_SPV_LISTEN_ADDR    HTTP adapter bind address (default: 127.0.0.1)");
    println!("  BTC_SPV_LISTEN_PORT    HTTP adapter bind port (default: 8080)");
    println!("  BTC_SPV_LOG_LEVEL      trace|debug|info|warn|error (default: info)");
    println!("  BTC_SPV_LOG_FORMAT     pretty|json (default: pretty)");
}

async fn run_index(args: &[String], mut config: Config) -> ExitCode {
    let Some(blocks_dir) = args.first() else {
        eprintln!("usage: btc-spv-proxy index <blocks-dir> [--port <port>]");
        return ExitCode::FAILURE;
    };

    if let Some(port_idx) = args.iter().position(|a| a == "--port") {
        if let Some(port) = args.get(port_idx + 1).and_then(|p| p.parse().ok()) {
            config.listen_port = port;
        }
    }

    let data = match btc_spv_proxy::files::load_block_stream(Path::new(blocks_dir)) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("failed to read blocks directory {blocks_dir}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (index, _header_stream) = match build_index(&data) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("failed to parse block stream: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        target: "btc_spv_proxy::setup",
        block_count = index.block_count(),
        tx_count = index.tx_count(),
        "index built"
    );

    let addr = config.listen_socket();
    if let Err(e) = btc_spv_proxy::http::serve(index, &addr).await {
        eprintln!("http server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run_headers(args: &[String]) -> ExitCode {
    let Some(header_file) = args.first() else {
        eprintln!("usage: btc-spv-proxy headers <header-file>");
        return ExitCode::FAILURE;
    };

    let chain = match load_chain(header_file) {
        Ok(chain) => chain,
        Err(code) => return code,
    };

    println!("headers:    {}", chain.store().len());
    println!("tip:        {}", chain.tip().to_display());
    println!("height:     {}", chain.tip_height());
    ExitCode::SUCCESS
}

fn run_verify(args: &[String]) -> ExitCode {
    if args.len() < 5 {
        eprintln!(
            "usage: btc-spv-proxy verify <header-file> <txid> <tx_count> <leaf_index> <root> <branch...>"
        );
        return ExitCode::FAILURE;
    }

    let header_file = &args[0];
    let chain = match load_chain(header_file) {
        Ok(chain) => chain,
        Err(code) => return code,
    };

    let Ok(txid) = DisplayHash::from_hex(&args[1]) else {
        eprintln!("invalid txid hex");
        return ExitCode::FAILURE;
    };
    let Ok(tx_count) = args[2].parse::<u64>() else {
        eprintln!("invalid tx_count");
        return ExitCode::FAILURE;
    };
    let Ok(leaf_index) = args[3].parse::<u64>() else {
        eprintln!("invalid leaf_index");
        return ExitCode::FAILURE;
    };
    let Ok(root) = DisplayHash::from_hex(&args[4]) else {
        eprintln!("invalid root hex");
        return ExitCode::FAILURE;
    };

    let mut branch = Vec::new();
    for raw in &args[5..] {
        match DisplayHash::from_hex(raw) {
            Ok(hash) => branch.push(hash.to_internal()),
            Err(_) => {
                eprintln!("invalid branch hash: {raw}");
                return ExitCode::FAILURE;
            }
        }
    }

    let proof = Proof {
        tx_count,
        leaf_index,
        branch,
        merkle_root: root.to_internal(),
    };

    let outcome = verify(&chain, txid, &proof);
    println!("verdict: {}", outcome.message());
    println!("depth:   {}", outcome.depth());
    ExitCode::SUCCESS
}

fn load_chain(header_file: &str) -> Result<HeaderChain, ExitCode> {
    let data = std::fs::read(header_file).map_err(|e| {
        eprintln!("failed to read header file {header_file}: {e}");
        ExitCode::FAILURE
    })?;
    let store = HeaderStore::from_stream(&data).map_err(|e| {
        eprintln!("failed to parse header file: {e}");
        ExitCode::FAILURE
    })?;
    Ok(HeaderChain::build(store))
}
