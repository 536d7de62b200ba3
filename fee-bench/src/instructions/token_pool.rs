use solana_sdk::{program_pack::Pack, pubkey::Pubkey};
use spl_token::state::{Account as SplTokenAccount, AccountState};
use tracing::debug;

use crate::{
    constants::{COMPRESSED_TOKEN_PROGRAM_ID, NUM_MAX_POOL_ACCOUNTS, POOL_SEED},
    errors::InstructionError,
    rpc::{RpcConnection, RpcError},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenPoolInfo {
    pub mint: Pubkey,
    pub token_pool_pda: Pubkey,
    pub pool_index: u8,
    pub balance: u64,
    pub is_initialized: bool,
}

/// Pool 0 is seeded with `[b"pool", mint]`, later pools append their index.
pub fn find_token_pool_pda_with_index(mint: &Pubkey, pool_index: u8) -> (Pubkey, u8) {
    let index_seed = [pool_index];
    let mut seeds: Vec<&[u8]> = vec![POOL_SEED, mint.as_ref()];
    if pool_index > 0 {
        seeds.push(&index_seed);
    }
    Pubkey::find_program_address(&seeds, &COMPRESSED_TOKEN_PROGRAM_ID)
}

pub async fn get_token_pool_infos<R: RpcConnection>(
    rpc: &R,
    mint: &Pubkey,
) -> Result<Vec<TokenPoolInfo>, RpcError> {
    let addresses: Vec<Pubkey> = (0..NUM_MAX_POOL_ACCOUNTS)
        .map(|index| find_token_pool_pda_with_index(mint, index).0)
        .collect();
    let accounts = rpc.get_multiple_accounts(&addresses).await?;

    let infos = addresses
        .iter()
        .zip(accounts)
        .enumerate()
        .map(|(index, (address, account))| {
            let token_account = account
                .filter(|account| account.owner == spl_token::ID)
                .and_then(|account| SplTokenAccount::unpack(&account.data).ok());
            TokenPoolInfo {
                mint: *mint,
                token_pool_pda: *address,
                pool_index: index as u8,
                balance: token_account
                    .as_ref()
                    .map(|account| account.amount)
                    .unwrap_or_default(),
                is_initialized: token_account
                    .as_ref()
                    .map(|account| account.state == AccountState::Initialized)
                    .unwrap_or(false),
            }
        })
        .collect::<Vec<_>>();
    debug!(
        "{} of {} token pools initialized for {}",
        infos.iter().filter(|info| info.is_initialized).count(),
        infos.len(),
        mint
    );
    Ok(infos)
}

pub fn select_token_pool_info(infos: &[TokenPoolInfo]) -> Result<TokenPoolInfo, InstructionError> {
    infos
        .iter()
        .find(|info| info.is_initialized)
        .copied()
        .ok_or_else(|| InstructionError::NoTokenPool {
            mint: infos.first().map(|info| info.mint).unwrap_or_default(),
        })
}
