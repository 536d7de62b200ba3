use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcTransactionConfig};
use solana_sdk::{
    account::Account,
    address_lookup_table::state::AddressLookupTable,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};
use solana_transaction_status::UiTransactionEncoding;
use tracing::debug;

use crate::rpc::{errors::RpcError, rpc_connection::RpcConnection};

/// Chain access over Solana JSON-RPC at `confirmed` commitment.
pub struct SolanaRpcConnection {
    pub client: RpcClient,
}

impl Debug for SolanaRpcConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The url carries the api key.
        write!(
            f,
            "SolanaRpcConnection {{ commitment: {:?} }}",
            self.client.commitment().commitment
        )
    }
}

impl SolanaRpcConnection {
    pub fn new<U: ToString>(url: U, commitment_config: Option<CommitmentConfig>) -> Self {
        let commitment_config = commitment_config.unwrap_or(CommitmentConfig::confirmed());
        let client = RpcClient::new_with_commitment(url.to_string(), commitment_config);
        Self { client }
    }
}

#[async_trait]
impl RpcConnection for SolanaRpcConnection {
    async fn get_account(&self, address: Pubkey) -> Result<Option<Account>, RpcError> {
        self.client
            .get_account_with_commitment(&address, self.client.commitment())
            .await
            .map(|response| response.value)
            .map_err(RpcError::from)
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, RpcError> {
        self.client
            .get_multiple_accounts(addresses)
            .await
            .map_err(RpcError::from)
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, RpcError> {
        self.client
            .get_balance(pubkey)
            .await
            .map_err(RpcError::from)
    }

    async fn get_latest_blockhash(&mut self) -> Result<Hash, RpcError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(RpcError::from)
    }

    async fn process_transaction(
        &mut self,
        transaction: Transaction,
    ) -> Result<Signature, RpcError> {
        let signature = self
            .client
            .send_and_confirm_transaction(&transaction)
            .await?;
        debug!("Confirmed {}", signature);
        Ok(signature)
    }

    async fn confirm_transaction(&self, signature: Signature) -> Result<bool, RpcError> {
        self.client
            .poll_for_signature_with_commitment(&signature, self.client.commitment())
            .await?;
        Ok(true)
    }

    async fn get_transaction_slot(&self, signature: &Signature) -> Result<u64, RpcError> {
        let statuses = self.client.get_signature_statuses(&[*signature]).await?;
        statuses
            .value
            .first()
            .and_then(|status| status.as_ref())
            .map(|status| status.slot)
            .ok_or(RpcError::TransactionNotFound(*signature))
    }

    async fn get_transaction_fee(&self, signature: &Signature) -> Result<u64, RpcError> {
        let transaction = self
            .client
            .get_transaction_with_config(
                signature,
                RpcTransactionConfig {
                    encoding: Some(UiTransactionEncoding::Json),
                    commitment: Some(CommitmentConfig::confirmed()),
                    max_supported_transaction_version: Some(0),
                },
            )
            .await?;
        transaction
            .transaction
            .meta
            .map(|meta| meta.fee)
            .ok_or(RpcError::MissingMeta(*signature))
    }

    async fn get_address_lookup_table(&self, address: &Pubkey) -> Result<Vec<Pubkey>, RpcError> {
        let account = self
            .get_account(*address)
            .await?
            .ok_or_else(|| RpcError::InvalidLookupTable(format!("{} does not exist", address)))?;
        let table = AddressLookupTable::deserialize(&account.data)
            .map_err(|e| RpcError::InvalidLookupTable(format!("{}: {}", address, e)))?;
        Ok(table.addresses.to_vec())
    }
}
