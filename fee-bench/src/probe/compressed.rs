use std::time::Duration;

use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::Instruction,
    signature::{Keypair, Signature, Signer},
};
use spl_token::native_mint;
use tracing::{debug, info};

use super::{ProbeResult, SetupStep};
use crate::{
    config::BenchConfig,
    constants::{lamports_to_sol, COMPRESS_MULTIPLIER},
    errors::{BenchError, InstructionError},
    indexer::{
        tree_info::{find_state_tree_info, select_state_tree_info},
        wait_for_indexer, Indexer,
    },
    instructions::{
        compressed_token::{
            create_compress_instruction, create_compressed_transfer_instruction,
            select_input_accounts, InputTokenAccount,
        },
        token_pool::{get_token_pool_infos, select_token_pool_info},
        wrap::{create_wrap_sol_instructions, wsol_token_account},
    },
    rpc::RpcConnection,
};

pub const WRAP_LABEL: &str = "Wrap SOL";
pub const COMPRESS_LABEL: &str = "Compress wSOL";
pub const COMPRESSED_TRANSFER_LABEL: &str = "Compressed token transfer";

#[derive(Debug, Clone, PartialEq)]
pub struct CompressedProbeResult {
    pub transfer: ProbeResult,
    pub setup: Vec<SetupStep>,
}

impl CompressedProbeResult {
    pub fn setup_fee_lamports(&self) -> u64 {
        self.setup.iter().map(|step| step.fee_lamports).sum()
    }

    /// Everything the compressed path cost, setup included.
    pub fn total_fee_lamports(&self) -> u64 {
        self.setup_fee_lamports() + self.transfer.fee_lamports
    }
}

/// Wraps `2 × test_amount` of SOL, compresses it and transfers
/// `test_amount` of the compressed balance to the recipient. Only the fee of
/// the final transfer is the measurement.
pub async fn run_compressed_probe<R: RpcConnection, I: Indexer>(
    rpc: &mut R,
    indexer: &I,
    payer: &Keypair,
    config: &BenchConfig,
) -> Result<CompressedProbeResult, BenchError> {
    let owner = payer.pubkey();
    let mint = native_mint::ID;
    let compress_amount = config.test_amount * COMPRESS_MULTIPLIER;
    let mut setup = Vec::with_capacity(2);

    // Wrap
    let token_account = wsol_token_account(&owner);
    let create_account = rpc.get_account(token_account).await?.is_none();
    info!(
        "Wrapping {} SOL into {}{}",
        lamports_to_sol(compress_amount),
        token_account,
        if create_account { " (creating account)" } else { "" }
    );
    let instructions =
        create_wrap_sol_instructions(&owner, &owner, compress_amount, create_account)?;
    let signature = rpc
        .create_and_send_transaction(&instructions, &owner, &[payer])
        .await?;
    setup.push(setup_step(rpc, WRAP_LABEL, signature).await?);

    // Compress
    let tree_infos = rpc.get_state_tree_infos(&config.lookup_tables).await?;
    let tree_info = select_state_tree_info(&tree_infos)?;
    let token_pool = select_token_pool_info(&get_token_pool_infos(rpc, &mint).await?)?;
    debug!(
        "Compressing into tree {} via pool {} ({})",
        tree_info.tree, token_pool.pool_index, token_pool.token_pool_pda
    );
    let instruction = create_compress_instruction(
        &owner,
        &owner,
        &token_account,
        &mint,
        compress_amount,
        &tree_info.tree,
        &token_pool.token_pool_pda,
    )?;
    let signature = send_and_wait_for_indexer(
        rpc,
        indexer,
        &[
            ComputeBudgetInstruction::set_compute_unit_limit(config.compress_cu_limit),
            instruction,
        ],
        payer,
        config.indexer_sync_timeout,
    )
    .await?;
    rpc.confirm_transaction(signature).await?;
    info!("Compressed {} SOL: {}", lamports_to_sol(compress_amount), signature);
    setup.push(setup_step(rpc, COMPRESS_LABEL, signature).await?);

    // Transfer
    let accounts = indexer
        .get_compressed_token_accounts_by_owner(&owner, Some(&mint))
        .await?;
    let selected = select_input_accounts(&accounts, config.test_amount)?;
    let proof = indexer
        .get_validity_proof(selected.iter().map(|account| account.hash).collect())
        .await?;
    let inputs = selected
        .into_iter()
        .map(|account| {
            let info = find_state_tree_info(&tree_infos, &account.tree)?;
            Ok(InputTokenAccount {
                queue: info.queue,
                account,
            })
        })
        .collect::<Result<Vec<_>, InstructionError>>()?;
    let output_tree = match inputs.first() {
        Some(input) => find_state_tree_info(&tree_infos, &input.account.tree)?.output_tree(),
        None => tree_info.tree,
    };
    info!(
        "Transferring {} compressed SOL to {} from {} input(s)",
        lamports_to_sol(config.test_amount),
        config.recipient,
        inputs.len()
    );
    let instruction = create_compressed_transfer_instruction(
        &owner,
        &owner,
        &mint,
        &inputs,
        &proof,
        &config.recipient,
        config.test_amount,
        &output_tree,
    )?;
    let signature = send_and_wait_for_indexer(
        rpc,
        indexer,
        &[
            ComputeBudgetInstruction::set_compute_unit_limit(config.transfer_cu_limit),
            instruction,
        ],
        payer,
        config.indexer_sync_timeout,
    )
    .await?;
    info!("Compressed transfer confirmed: {}", signature);

    let fee = rpc.get_transaction_fee(&signature).await?;
    info!("Compressed transfer fee: {} lamports", fee);
    Ok(CompressedProbeResult {
        transfer: ProbeResult::new(COMPRESSED_TRANSFER_LABEL, signature, fee, config),
        setup,
    })
}

/// Sends and confirms, then waits until the indexer has seen the slot the
/// transaction landed in so its outputs can be queried.
pub async fn send_and_wait_for_indexer<R: RpcConnection, I: Indexer>(
    rpc: &mut R,
    indexer: &I,
    instructions: &[Instruction],
    payer: &Keypair,
    timeout: Duration,
) -> Result<Signature, BenchError> {
    let signature = rpc
        .create_and_send_transaction(instructions, &payer.pubkey(), &[payer])
        .await?;
    let slot = rpc.get_transaction_slot(&signature).await?;
    wait_for_indexer(indexer, slot, timeout).await?;
    Ok(signature)
}

async fn setup_step<R: RpcConnection>(
    rpc: &R,
    label: &str,
    signature: Signature,
) -> Result<SetupStep, BenchError> {
    let fee_lamports = rpc.get_transaction_fee(&signature).await?;
    debug!("{} fee: {} lamports", label, fee_lamports);
    Ok(SetupStep {
        label: label.to_string(),
        signature,
        fee_lamports,
    })
}
