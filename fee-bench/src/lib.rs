use solana_sdk::signature::Signer;
use tokio::time::sleep;
use tracing::info;

pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod indexer;
pub mod instructions;
pub mod probe;
pub mod report;
pub mod rpc;
pub mod telemetry;
pub mod wallet;

use crate::{
    cli::BenchArgs,
    config::BenchConfig,
    constants::lamports_to_sol,
    errors::BenchError,
    indexer::Indexer,
    probe::{run_compressed_probe, run_standard_probe},
    report::BenchReport,
    rpc::RpcConnection,
    wallet::load_wallet,
};

/// Runs the standard probe, pauses, then runs the compressed probe with the
/// same wallet and recipient.
pub async fn run<R: RpcConnection, I: Indexer>(
    config: &BenchConfig,
    rpc: &mut R,
    indexer: &I,
) -> Result<BenchReport, BenchError> {
    let payer = load_wallet(config.seed_phrase.as_deref())?;
    let balance = rpc.get_balance(&payer.pubkey()).await?;
    info!(
        "Wallet {} holds {} SOL",
        payer.pubkey(),
        lamports_to_sol(balance)
    );

    let standard = run_standard_probe(rpc, &payer, config).await?;

    info!(
        "Waiting {}s before the compressed transfer",
        config.probe_delay.as_secs()
    );
    sleep(config.probe_delay).await;

    let compressed = run_compressed_probe(rpc, indexer, &payer, config).await?;
    Ok(BenchReport {
        standard,
        compressed,
    })
}

/// Validates `args` before `connect` is called, so nothing touches the
/// network on a configuration error.
pub async fn run_from_args<R, I, F>(args: &BenchArgs, connect: F) -> Result<BenchReport, BenchError>
where
    R: RpcConnection,
    I: Indexer,
    F: FnOnce(&BenchConfig) -> (R, I),
{
    let config = BenchConfig::from_args(args)?;
    let (mut rpc, indexer) = connect(&config);
    run(&config, &mut rpc, &indexer).await
}
