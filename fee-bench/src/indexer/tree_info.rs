use solana_sdk::{pubkey, pubkey::Pubkey};

use super::types::{NextTreeInfo, TreeInfo};
use crate::{errors::InstructionError, rpc::errors::RpcError};

// v1 trees live at vanity addresses. Only consulted for input accounts whose
// tree is missing from the fetched lookup tables.
const LEGACY_STATE_TREES: [(Pubkey, Pubkey, Pubkey); 10] = [
    (
        pubkey!("smt1NamzXdq4AMqS2fS2F1i5KTYPZRhoHgWx38d8WsT"),
        pubkey!("nfq1NvQDJ2GEgnS8zt9prAe8rjjpAW1zFkrvZoBR148"),
        pubkey!("cpi1uHzrEhBG733DoEJNgHCyRS3XmmyVNZx5fonubE4"),
    ),
    (
        pubkey!("smt2rJAFdyJJupwMKAqTNAJwvjhmiZ4JYGZmbVRw1Ho"),
        pubkey!("nfq2hgS7NYemXsFaFUCe3EMXSDSfnZnAe27jC6aPP1X"),
        pubkey!("cpi2cdhkH5roePvcudTgUL8ppEBfTay1desGh8G8QxK"),
    ),
    (
        pubkey!("smt3AFtReRGVcrP11D6bSLEaKdUmrGfaTNowMVccJeu"),
        pubkey!("nfq3de4qt9d3wHxXWy1wcge3EXhid25mCr12bNWFdtV"),
        pubkey!("cpi3Ycq5qZzFEwZSWgwMhMi1M9KG4KVx4T9GUmb58gk"),
    ),
    (
        pubkey!("smt4vjXvdjDFzvRMUxwTWnSy4c7cKkMaHuPrGsdDH7V"),
        pubkey!("nfq4Ncp1vk3mFnCQ9cvwidp9k2L6fxEyCo2nerYD25A"),
        pubkey!("cpi4yJqDt4SjPXaxKkvhXRowqiFxv1jKgoq6jDMfc2c"),
    ),
    (
        pubkey!("smt5uPaQT9n6b1qAkgyonmzRxtuazA53Rddwntqistc"),
        pubkey!("nfq5b5xEguPtdD6uPetZduyrB5EUqad7gcUE46rALau"),
        pubkey!("cpi5ryT8ULH2aLs8u1V6vG1uA71d52tRqHrDUxiVn8A"),
    ),
    (
        pubkey!("smt6ukQDSPPYHSshQovmiRUjG9jGFq2hW9vgrDFk5Yz"),
        pubkey!("nfq6uzaNZ5n3EWF4t64M93AWzLGt5dXTikEA9fFRktv"),
        pubkey!("cpi6maYjfu2TGbRu4dzsjzs4BHDGKdTyy4bhPNCmRmV"),
    ),
    (
        pubkey!("smt7onMFkvi3RbyhQCMajudYQkB1afAFt9CDXBQTLz6"),
        pubkey!("nfq7yytdKkkLabu1KpvLsa5VPkvCT4jPWus5Yi74HTH"),
        pubkey!("cpi7qnzKBpzhzVfGXyaabXyhGJVTaNQSKh4x4jffLLa"),
    ),
    (
        pubkey!("smt8TYxNy8SuhAdKJ8CeLtDkr2w6dgDmdz5ruiDw9Y9"),
        pubkey!("nfq8vExDykci3VUSpj9R1totVst87hJfFWevNK4hiFb"),
        pubkey!("cpi8GBR819DvLLWmiVgYmjLAhYX6j9bnBXaYXCHEA7i"),
    ),
    (
        pubkey!("smt9ReAYRF5eFjTd5gBJMn5aKwNRcmp3ub2CQr2vW7j"),
        pubkey!("nfq9KFpNQL45ppP6ZG7zBpUeN18LZrNGkKyvV1kjTX2"),
        pubkey!("cpi9CEV5DdCA5pyizmqv2Tk2aFBFwD32WSv6qaSN4Vb"),
    ),
    (
        pubkey!("smtAvYA5UbTRyKAkAj5kHs1CmrA42t6WkVLi4c6mA1f"),
        pubkey!("nfqAroCRkcZBgsAJDNkptKpsSWyM6cgB9XpWNNiCEC4"),
        pubkey!("cpiAb2eNFf6MQeqMWEyEjSN3VJcD5hghujhmtdcMuZp"),
    ),
];

/// Looks up a v1 state tree by tree or queue pubkey in the built-in table.
pub fn legacy_state_tree(pubkey: &Pubkey) -> Option<TreeInfo> {
    LEGACY_STATE_TREES
        .iter()
        .find(|(tree, queue, _)| tree == pubkey || queue == pubkey)
        .map(|(tree, queue, cpi_context)| TreeInfo {
            tree: *tree,
            queue: *queue,
            cpi_context: Some(*cpi_context),
            next_tree_info: None,
            rolled_over: false,
        })
}

/// Builds tree infos from the state tree lookup table, whose addresses are
/// stored as `[tree, queue, cpi_context]` triples, and the nullify table,
/// which lists trees that have been rolled over. A rolled over tree points
/// at the first tree that is still active.
pub fn state_tree_infos_from_lookup_tables(
    state_tree_addresses: &[Pubkey],
    nullify_table_addresses: &[Pubkey],
) -> Result<Vec<TreeInfo>, RpcError> {
    if state_tree_addresses.len() % 3 != 0 {
        return Err(RpcError::InvalidLookupTable(format!(
            "state tree lookup table holds {} addresses, expected a multiple of 3",
            state_tree_addresses.len()
        )));
    }

    let mut infos: Vec<TreeInfo> = state_tree_addresses
        .chunks_exact(3)
        .map(|chunk| TreeInfo {
            tree: chunk[0],
            queue: chunk[1],
            cpi_context: Some(chunk[2]),
            next_tree_info: None,
            rolled_over: nullify_table_addresses.contains(&chunk[0]),
        })
        .collect();

    let successor = infos
        .iter()
        .find(|info| !info.rolled_over)
        .copied()
        .map(NextTreeInfo::from);

    for info in infos.iter_mut().filter(|info| info.rolled_over) {
        info.next_tree_info = successor;
    }

    Ok(infos)
}

/// The currently writable state tree: the first one that is neither rolled
/// over nor pointing at a successor.
pub fn select_state_tree_info(infos: &[TreeInfo]) -> Result<TreeInfo, InstructionError> {
    infos
        .iter()
        .find(|info| info.is_active())
        .copied()
        .ok_or(InstructionError::NoActiveStateTree)
}

/// Resolves the tree info for an input account's tree, preferring the
/// fetched infos over the built-in table.
pub fn find_state_tree_info(infos: &[TreeInfo], tree: &Pubkey) -> Result<TreeInfo, InstructionError> {
    infos
        .iter()
        .find(|info| info.tree == *tree)
        .copied()
        .or_else(|| legacy_state_tree(tree))
        .ok_or(InstructionError::UnknownStateTree { tree: *tree })
}
