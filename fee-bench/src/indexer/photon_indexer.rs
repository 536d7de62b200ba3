use std::fmt::Debug;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, trace};

use super::{
    base58::{decode_base58_option_to_pubkey, decode_base58_to_fixed_array, decode_base58_to_pubkey},
    types::{CompressedTokenAccount, ValidityProofWithContext},
    Indexer, IndexerError,
};
use crate::instructions::compressed_token::CompressedProof;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RpcRequest<T> {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    #[serde(rename = "params")]
    pub parameters: T,
}

impl<T> RpcRequest<T> {
    pub fn new(method: &str, parameters: T) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: "light-fee-bench".to_string(),
            method: method.to_string(),
            parameters,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcResponseError>,
}

#[derive(Deserialize, Debug)]
pub struct RpcResponseError {
    pub code: i64,
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct Context {
    pub slot: u64,
}

#[derive(Deserialize, Debug)]
pub struct ContextResponse<T> {
    pub context: Context,
    pub value: T,
}

#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetCompressedTokenAccountsByOwnerParams {
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u16>,
}

#[derive(Deserialize, Debug)]
pub struct TokenAccountList {
    pub items: Vec<TokenAccount>,
    pub cursor: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccount {
    pub account: Account,
    pub token_data: TokenData,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub hash: String,
    pub lamports: u64,
    pub leaf_index: u32,
    pub tree: String,
}

#[derive(Deserialize, Debug)]
pub struct TokenData {
    pub mint: String,
    pub owner: String,
    pub amount: u64,
    pub delegate: Option<String>,
}

#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetValidityProofParams {
    pub hashes: Vec<String>,
    pub new_addresses_with_trees: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ValidityProof {
    pub compressed_proof: Option<CompressedProofModel>,
    pub root_indices: Vec<u64>,
    pub leaf_indices: Vec<u32>,
    pub merkle_trees: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct CompressedProofModel {
    pub a: Vec<u8>,
    pub b: Vec<u8>,
    pub c: Vec<u8>,
}

impl TryFrom<&TokenAccount> for CompressedTokenAccount {
    type Error = IndexerError;

    fn try_from(value: &TokenAccount) -> Result<Self, Self::Error> {
        Ok(CompressedTokenAccount {
            hash: decode_base58_to_fixed_array("hash", &value.account.hash)?,
            tree: decode_base58_to_pubkey("tree", &value.account.tree)?,
            leaf_index: value.account.leaf_index,
            lamports: value.account.lamports,
            mint: decode_base58_to_pubkey("mint", &value.token_data.mint)?,
            owner: decode_base58_to_pubkey("owner", &value.token_data.owner)?,
            amount: value.token_data.amount,
            delegate: decode_base58_option_to_pubkey("delegate", &value.token_data.delegate)?,
        })
    }
}

impl TryFrom<&CompressedProofModel> for CompressedProof {
    type Error = IndexerError;

    fn try_from(value: &CompressedProofModel) -> Result<Self, Self::Error> {
        let invalid = |part: &str, len: usize| {
            IndexerError::InvalidResponseData(format!("proof.{} has {} bytes", part, len))
        };
        Ok(CompressedProof {
            a: value
                .a
                .as_slice()
                .try_into()
                .map_err(|_| invalid("a", value.a.len()))?,
            b: value
                .b
                .as_slice()
                .try_into()
                .map_err(|_| invalid("b", value.b.len()))?,
            c: value
                .c
                .as_slice()
                .try_into()
                .map_err(|_| invalid("c", value.c.len()))?,
        })
    }
}

impl TryFrom<ValidityProof> for ValidityProofWithContext {
    type Error = IndexerError;

    fn try_from(value: ValidityProof) -> Result<Self, Self::Error> {
        let root_indices = value
            .root_indices
            .iter()
            .map(|index| {
                u16::try_from(*index).map_err(|_| {
                    IndexerError::InvalidResponseData(format!("root index {} overflows u16", index))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let merkle_trees = value
            .merkle_trees
            .iter()
            .map(|tree| decode_base58_to_pubkey("merkleTrees", tree))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidityProofWithContext {
            compressed_proof: value
                .compressed_proof
                .as_ref()
                .map(CompressedProof::try_from)
                .transpose()?,
            root_indices,
            leaf_indices: value.leaf_indices,
            merkle_trees,
        })
    }
}

/// Photon compression indexer over JSON-RPC. Helius serves it on the same
/// endpoint as the chain RPC.
pub struct PhotonIndexer {
    url: String,
    client: reqwest::Client,
}

impl Debug for PhotonIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The url carries the api key.
        f.debug_struct("PhotonIndexer").finish_non_exhaustive()
    }
}

impl PhotonIndexer {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        let url = match api_key {
            Some(key) if !url.contains("api-key=") => {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{}{}api-key={}", url, separator, key)
            }
            _ => url,
        };
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    async fn send<P: Serialize + Send + Sync, T: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<T, IndexerError> {
        let request = RpcRequest::new(method, params);
        trace!("Photon request {}", method);
        let response: RpcResponse<T> = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_response(method, response)
    }
}

fn parse_response<T>(method: &str, response: RpcResponse<T>) -> Result<T, IndexerError> {
    if let Some(error) = response.error {
        return Err(IndexerError::PhotonError {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| IndexerError::missing_result(method))
}

#[async_trait]
impl Indexer for PhotonIndexer {
    async fn get_indexer_slot(&self) -> Result<u64, IndexerError> {
        self.send("getIndexerSlot", serde_json::json!({})).await
    }

    async fn get_compressed_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: Option<&Pubkey>,
    ) -> Result<Vec<CompressedTokenAccount>, IndexerError> {
        let mut accounts = Vec::new();
        let mut cursor = None;
        loop {
            let params = GetCompressedTokenAccountsByOwnerParams {
                owner: owner.to_string(),
                mint: mint.map(|mint| mint.to_string()),
                cursor: cursor.take(),
                limit: None,
            };
            let response: ContextResponse<TokenAccountList> = self
                .send("getCompressedTokenAccountsByOwner", params)
                .await?;
            for item in response.value.items.iter() {
                accounts.push(CompressedTokenAccount::try_from(item)?);
            }
            match response.value.cursor {
                Some(next) if !response.value.items.is_empty() => cursor = Some(next),
                _ => break,
            }
        }
        debug!(
            "Found {} compressed token accounts for {}",
            accounts.len(),
            owner
        );
        Ok(accounts)
    }

    async fn get_validity_proof(
        &self,
        hashes: Vec<[u8; 32]>,
    ) -> Result<ValidityProofWithContext, IndexerError> {
        let params = GetValidityProofParams {
            hashes: hashes
                .iter()
                .map(|hash| bs58::encode(hash).into_string())
                .collect(),
            new_addresses_with_trees: Vec::new(),
        };
        let response: ContextResponse<ValidityProof> =
            self.send("getValidityProof", params).await?;
        debug!("Validity proof at slot {}", response.context.slot);
        ValidityProofWithContext::try_from(response.value)
    }
}
