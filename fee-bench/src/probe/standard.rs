use solana_sdk::{
    signature::{Keypair, Signer},
    system_instruction,
};
use tracing::info;

use super::ProbeResult;
use crate::{
    config::BenchConfig, constants::lamports_to_sol, errors::BenchError, rpc::RpcConnection,
};

pub const STANDARD_TRANSFER_LABEL: &str = "Standard SOL transfer";

/// Sends `test_amount` lamports to the recipient with a plain system
/// transfer and reads back the fee that was charged.
pub async fn run_standard_probe<R: RpcConnection>(
    rpc: &mut R,
    payer: &Keypair,
    config: &BenchConfig,
) -> Result<ProbeResult, BenchError> {
    info!(
        "Sending {} SOL to {}",
        lamports_to_sol(config.test_amount),
        config.recipient
    );
    let instruction =
        system_instruction::transfer(&payer.pubkey(), &config.recipient, config.test_amount);
    let signature = rpc
        .create_and_send_transaction(&[instruction], &payer.pubkey(), &[payer])
        .await?;
    info!("Standard transfer confirmed: {}", signature);

    let fee = rpc.get_transaction_fee(&signature).await?;
    info!("Standard transfer fee: {} lamports", fee);
    Ok(ProbeResult::new(
        STANDARD_TRANSFER_LABEL,
        signature,
        fee,
        config,
    ))
}
