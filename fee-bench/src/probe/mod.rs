use solana_sdk::signature::Signature;

use crate::{config::BenchConfig, constants::lamports_to_sol};

pub mod compressed;
pub mod standard;

pub use compressed::{run_compressed_probe, CompressedProbeResult};
pub use standard::run_standard_probe;

/// Fee measurement of one confirmed transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub label: String,
    pub signature: Signature,
    pub fee_lamports: u64,
    pub fee_sol: f64,
    pub explorer_url: String,
}

impl ProbeResult {
    pub fn new(label: &str, signature: Signature, fee_lamports: u64, config: &BenchConfig) -> Self {
        Self {
            label: label.to_string(),
            signature,
            fee_lamports,
            fee_sol: lamports_to_sol(fee_lamports),
            explorer_url: config.explorer_link(&signature.to_string()),
        }
    }
}

/// A transaction the compressed probe needs before it can transfer. Its fee
/// is reported but not compared.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupStep {
    pub label: String,
    pub signature: Signature,
    pub fee_lamports: u64,
}
