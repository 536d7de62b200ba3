use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Photon error {code}: {message}")]
    PhotonError { code: i64, message: String },

    #[error("Missing result for {context}")]
    MissingResult { context: String },

    #[error("Base58 decode error for {field}: {message}")]
    Base58DecodeError { field: String, message: String },

    #[error("Invalid response data: {0}")]
    InvalidResponseData(String),

    #[error("Indexer not synced to slot {slot} after {elapsed_secs}s")]
    NotSyncedToSlot { slot: u64, elapsed_secs: u64 },
}

impl IndexerError {
    pub fn missing_result(context: &str) -> Self {
        Self::MissingResult {
            context: context.to_string(),
        }
    }

    pub fn base58_decode_error(field: &str, message: impl ToString) -> Self {
        Self::Base58DecodeError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
