use solana_client::client_error::ClientError;
use solana_sdk::{signature::Signature, transaction::TransactionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("TransactionError: {0}")]
    TransactionError(#[from] Box<TransactionError>),

    #[error("ClientError: {0}")]
    ClientError(#[from] Box<ClientError>),

    #[error("Transaction {0} not found")]
    TransactionNotFound(Signature),

    #[error("Transaction {0} has no status meta")]
    MissingMeta(Signature),

    #[error("Invalid lookup table {0}")]
    InvalidLookupTable(String),

    #[error("Error: `{0}`")]
    CustomError(String),
}

impl From<TransactionError> for RpcError {
    fn from(err: TransactionError) -> Self {
        RpcError::TransactionError(Box::new(err))
    }
}

impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        RpcError::ClientError(Box::new(err))
    }
}
