use std::time::{Duration, Instant};

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use tokio::time::sleep;
use tracing::{debug, warn};

pub mod base58;
mod error;
pub mod photon_indexer;
pub mod tree_info;
pub mod types;

pub use error::IndexerError;
pub use photon_indexer::PhotonIndexer;
pub use types::{CompressedTokenAccount, NextTreeInfo, TreeInfo, ValidityProofWithContext};

const SYNC_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[async_trait]
pub trait Indexer: Send + Sync {
    /// Latest slot the indexer has processed.
    async fn get_indexer_slot(&self) -> Result<u64, IndexerError>;

    async fn get_compressed_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: Option<&Pubkey>,
    ) -> Result<Vec<CompressedTokenAccount>, IndexerError>;

    async fn get_validity_proof(
        &self,
        hashes: Vec<[u8; 32]>,
    ) -> Result<ValidityProofWithContext, IndexerError>;
}

/// Polls until the indexer has processed `slot`, so that state written by a
/// transaction landed in that slot can be queried.
pub async fn wait_for_indexer<I: Indexer>(
    indexer: &I,
    slot: u64,
    timeout: Duration,
) -> Result<(), IndexerError> {
    let started = Instant::now();
    let mut indexer_slot = indexer.get_indexer_slot().await?;

    while indexer_slot < slot {
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            return Err(IndexerError::NotSyncedToSlot {
                slot,
                elapsed_secs: elapsed.as_secs(),
            });
        }
        if slot - indexer_slot > 50 {
            warn!(
                "indexer is behind {} slots (target: {}, indexer: {})",
                slot - indexer_slot,
                slot,
                indexer_slot
            );
        }
        sleep(SYNC_POLL_INTERVAL).await;
        indexer_slot = indexer.get_indexer_slot().await?;
    }

    debug!("Indexer synced to slot {} (at {})", slot, indexer_slot);
    Ok(())
}
