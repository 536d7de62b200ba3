use std::fmt::Debug;

use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};
use tracing::debug;

use crate::{
    config::StateTreeLookupTables,
    indexer::{tree_info::state_tree_infos_from_lookup_tables, TreeInfo},
    rpc::errors::RpcError,
};

#[async_trait]
pub trait RpcConnection: Send + Sync + Debug + 'static {
    async fn get_account(&self, address: Pubkey) -> Result<Option<Account>, RpcError>;
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, RpcError>;
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, RpcError>;
    async fn get_latest_blockhash(&mut self) -> Result<Hash, RpcError>;

    /// Submits the transaction and blocks until it is confirmed.
    async fn process_transaction(
        &mut self,
        transaction: Transaction,
    ) -> Result<Signature, RpcError>;

    /// Blocks until the signature reaches the connection's commitment.
    async fn confirm_transaction(&self, signature: Signature) -> Result<bool, RpcError>;

    async fn get_transaction_slot(&self, signature: &Signature) -> Result<u64, RpcError>;

    /// Fee in lamports charged for a confirmed transaction, read from its
    /// status meta.
    async fn get_transaction_fee(&self, signature: &Signature) -> Result<u64, RpcError>;

    async fn get_address_lookup_table(&self, address: &Pubkey) -> Result<Vec<Pubkey>, RpcError>;

    async fn get_state_tree_infos(
        &self,
        tables: &StateTreeLookupTables,
    ) -> Result<Vec<TreeInfo>, RpcError> {
        let state_trees = self
            .get_address_lookup_table(&tables.state_tree_lookup_table)
            .await?;
        let nullified_trees = self.get_address_lookup_table(&tables.nullify_table).await?;
        let infos = state_tree_infos_from_lookup_tables(&state_trees, &nullified_trees)?;
        debug!("Fetched {} state tree infos", infos.len());
        Ok(infos)
    }

    async fn create_and_send_transaction<'a>(
        &'a mut self,
        instructions: &'a [Instruction],
        payer: &'a Pubkey,
        signers: &'a [&'a Keypair],
    ) -> Result<Signature, RpcError> {
        let blockhash = self.get_latest_blockhash().await?;
        let transaction =
            Transaction::new_signed_with_payer(instructions, Some(payer), signers, blockhash);
        self.process_transaction(transaction).await
    }
}
