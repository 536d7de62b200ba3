use solana_sdk::pubkey::Pubkey;

use crate::instructions::compressed_token::CompressedProof;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextTreeInfo {
    pub tree: Pubkey,
    pub queue: Pubkey,
    pub cpi_context: Option<Pubkey>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeInfo {
    pub tree: Pubkey,
    pub queue: Pubkey,
    pub cpi_context: Option<Pubkey>,
    pub next_tree_info: Option<NextTreeInfo>,
    /// Listed in the nullify table. Still readable, never written to.
    pub rolled_over: bool,
}

impl TreeInfo {
    pub fn is_active(&self) -> bool {
        !self.rolled_over && self.next_tree_info.is_none()
    }

    /// The tree new output state should be written to: this tree, or its
    /// successor once it has been rolled over.
    pub fn output_tree(&self) -> Pubkey {
        match self.next_tree_info {
            Some(next) => next.tree,
            None => self.tree,
        }
    }
}

impl From<TreeInfo> for NextTreeInfo {
    fn from(info: TreeInfo) -> Self {
        Self {
            tree: info.tree,
            queue: info.queue,
            cpi_context: info.cpi_context,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressedTokenAccount {
    pub hash: [u8; 32],
    pub tree: Pubkey,
    pub leaf_index: u32,
    pub lamports: u64,
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidityProofWithContext {
    pub compressed_proof: Option<CompressedProof>,
    pub root_indices: Vec<u16>,
    pub leaf_indices: Vec<u32>,
    pub merkle_trees: Vec<Pubkey>,
}
