use solana_sdk::{program_error::ProgramError, pubkey::Pubkey};
use thiserror::Error;

use crate::{indexer::IndexerError, rpc::errors::RpcError};

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),

    #[error("Instruction error: {0}")]
    Instruction(#[from] InstructionError),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} is not set")]
    NotSet { name: &'static str },

    #[error("Invalid pubkey: {field} - {error}")]
    InvalidPubkey { field: &'static str, error: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum WalletError {
    #[error("SEED_PHRASE is not set")]
    SeedPhraseNotSet,

    #[error("Invalid derivation: {reason}")]
    Derivation { reason: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum InstructionError {
    #[error("No active state tree available")]
    NoActiveStateTree,

    #[error("No initialized token pool for mint {mint}")]
    NoTokenPool { mint: Pubkey },

    #[error("Insufficient compressed balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("Unknown queue for state tree {tree}")]
    UnknownStateTree { tree: Pubkey },

    #[error("Proof covers {proof} accounts, expected {expected}")]
    AccountCountMismatch { proof: usize, expected: usize },

    #[error("Balance needs more than {max} input accounts")]
    TooManyInputs { max: usize },

    #[error("Too many packed accounts")]
    TooManyAccounts,

    #[error("Invalid instruction data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error("Failed to serialize instruction data: {0}")]
    Serialization(String),
}
