use std::fmt;

use crate::{
    constants::lamports_to_sol,
    probe::{CompressedProbeResult, ProbeResult},
};

pub const EQUAL_FEES_HEADLINE: &str = "Both transfers paid the same network fee.";
pub const DIFFERENT_FEES_HEADLINE: &str = "The transfers paid different network fees.";

const EXPLANATION: &str = "\
Solana charges a base fee of 5000 lamports per signature regardless of what a
transaction does, plus any prioritization fee the sender attaches. Compression
does not make a transfer cheaper to send: it removes the rent-exempt deposit a
new token account would otherwise lock up, by keeping account state in a
Merkle tree and proving it with a validity proof. The fee figures come from
each confirmed transaction's on-chain metadata.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeComparison {
    Equal,
    Different { standard: u64, compressed: u64 },
}

impl FeeComparison {
    pub fn new(standard: u64, compressed: u64) -> Self {
        if standard == compressed {
            FeeComparison::Equal
        } else {
            FeeComparison::Different {
                standard,
                compressed,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    pub standard: ProbeResult,
    pub compressed: CompressedProbeResult,
}

impl BenchReport {
    pub fn comparison(&self) -> FeeComparison {
        FeeComparison::new(
            self.standard.fee_lamports,
            self.compressed.transfer.fee_lamports,
        )
    }
}

fn write_probe(f: &mut fmt::Formatter<'_>, probe: &ProbeResult) -> fmt::Result {
    writeln!(f, "{}", probe.label)?;
    writeln!(f, "  signature: {}", probe.signature)?;
    writeln!(
        f,
        "  fee:       {} lamports ({:.9} SOL)",
        probe.fee_lamports, probe.fee_sol
    )?;
    writeln!(f, "  explorer:  {}", probe.explorer_url)
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Fee comparison ===")?;
        write_probe(f, &self.standard)?;
        write_probe(f, &self.compressed.transfer)?;
        writeln!(f)?;

        match self.comparison() {
            FeeComparison::Equal => {
                writeln!(f, "{}", EQUAL_FEES_HEADLINE)?;
                writeln!(f, "Each carries a single signature, so the base fee is the same.")?;
            }
            FeeComparison::Different {
                standard,
                compressed,
            } => {
                writeln!(f, "{}", DIFFERENT_FEES_HEADLINE)?;
                let (smaller, larger) = (standard.min(compressed), standard.max(compressed));
                writeln!(
                    f,
                    "The {} transfer paid {} lamports more.",
                    if compressed > standard {
                        "compressed"
                    } else {
                        "standard"
                    },
                    larger - smaller
                )?;
            }
        }

        if !self.compressed.setup.is_empty() {
            writeln!(f)?;
            writeln!(f, "Setup transactions (not part of the comparison):")?;
            for step in &self.compressed.setup {
                writeln!(
                    f,
                    "  {}: {} lamports ({})",
                    step.label, step.fee_lamports, step.signature
                )?;
            }
            let total = self.compressed.total_fee_lamports();
            writeln!(
                f,
                "  end-to-end compressed cost: {} lamports ({:.9} SOL)",
                total,
                lamports_to_sol(total)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{}", EXPLANATION)
    }
}

pub fn render_report(report: &BenchReport) -> String {
    report.to_string()
}
