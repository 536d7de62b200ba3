use solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey, pubkey::Pubkey};

/// Amount of SOL moved by the standard probe and by the compressed transfer.
pub const TEST_AMOUNT_SOL: f64 = 0.001;

/// The compressed probe compresses this many test amounts before it
/// transfers a single one, so a compressed balance remains afterwards.
pub const COMPRESS_MULTIPLIER: u64 = 2;

/// Solana bip44 account 0, change 0.
pub const DERIVATION_PATH: &str = "m/44'/501'/0'/0'";

pub const MAINNET_RPC_URL: &str = "https://mainnet.helius-rpc.com";
pub const DEFAULT_EXPLORER_URL: &str = "https://solscan.io/tx/";

pub const STATE_TREE_LOOKUP_TABLE_MAINNET: &str = "7i86eQs3GSqHjN47WdWLTCGMW6gde1q96G2EVnUyK2st";
pub const NULLIFIED_STATE_TREE_LOOKUP_TABLE_MAINNET: &str =
    "H9QD4u1fG7KmkAzn2tDXhheushxFe1EcrjGGyEFXeMqT";

pub const COMPRESSED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("cTokenmWW8bLPjZEBAUgYy3zKxQZW6VKi7bqNFEVv3m");
pub const LIGHT_SYSTEM_PROGRAM_ID: Pubkey = pubkey!("SySTEM1eSU2p4BGQfQpimFEWWSC1XDFeun3Nqzz3rT7");
pub const ACCOUNT_COMPRESSION_PROGRAM_ID: Pubkey =
    pubkey!("compr6CUsB5m2jS4Y3831ztGSTnDpnKJTKS95d64XVq");
pub const NOOP_PROGRAM_ID: Pubkey = pubkey!("noopb9bkMVfRPU8AsbpTUg8AQkHtKwMYZiFUjNRtMmV");

pub const POOL_SEED: &[u8] = b"pool";
pub const CPI_AUTHORITY_SEED: &[u8] = b"cpi_authority";
pub const NUM_MAX_POOL_ACCOUNTS: u8 = 5;

pub const DEFAULT_COMPRESS_CU_LIMIT: u32 = 1_000_000;
pub const DEFAULT_TRANSFER_CU_LIMIT: u32 = 500_000;

/// `floor(TEST_AMOUNT_SOL * LAMPORTS_PER_SOL)`
pub fn test_amount_lamports() -> u64 {
    (TEST_AMOUNT_SOL * LAMPORTS_PER_SOL as f64).floor() as u64
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_is_one_thousandth_sol() {
        assert_eq!(test_amount_lamports(), 1_000_000);
    }

    #[test]
    fn fee_converts_to_sol() {
        assert_eq!(lamports_to_sol(5_000), 0.000005);
        assert_eq!(lamports_to_sol(LAMPORTS_PER_SOL), 1.0);
    }
}
