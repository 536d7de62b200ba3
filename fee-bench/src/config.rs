use std::{str::FromStr, time::Duration};

use solana_sdk::pubkey::Pubkey;

use crate::{
    cli::BenchArgs,
    constants::{test_amount_lamports, MAINNET_RPC_URL},
    errors::ConfigError,
};

/// Validated run configuration. Built once before any transaction is created.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub rpc_url: String,
    pub indexer_url: String,
    pub api_key: String,
    pub seed_phrase: Option<String>,
    pub recipient: Pubkey,
    pub test_amount: u64,
    pub explorer_url: String,
    pub probe_delay: Duration,
    pub compress_cu_limit: u32,
    pub transfer_cu_limit: u32,
    pub indexer_sync_timeout: Duration,
    pub lookup_tables: StateTreeLookupTables,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateTreeLookupTables {
    pub state_tree_lookup_table: Pubkey,
    pub nullify_table: Pubkey,
}

impl BenchConfig {
    pub fn from_args(args: &BenchArgs) -> Result<Self, ConfigError> {
        let api_key = required(&args.api_key, "HELIUS_API_KEY")?;
        let recipient = parse_pubkey(
            &required(&args.recipient, "RECIPIENT_ADDRESS")?,
            "RECIPIENT_ADDRESS",
        )?;

        let rpc_url = args
            .rpc_url
            .clone()
            .unwrap_or_else(|| format!("{}/?api-key={}", MAINNET_RPC_URL, api_key));
        let indexer_url = args.indexer_url.clone().unwrap_or_else(|| rpc_url.clone());

        Ok(Self {
            rpc_url,
            indexer_url,
            api_key,
            seed_phrase: args.seed_phrase.clone(),
            recipient,
            test_amount: test_amount_lamports(),
            explorer_url: args.explorer_url.clone(),
            probe_delay: Duration::from_secs(args.probe_delay_secs),
            compress_cu_limit: args.compress_cu_limit,
            transfer_cu_limit: args.transfer_cu_limit,
            indexer_sync_timeout: Duration::from_secs(args.indexer_sync_timeout_secs),
            lookup_tables: StateTreeLookupTables {
                state_tree_lookup_table: parse_pubkey(
                    &args.state_tree_lookup_table,
                    "STATE_TREE_LOOKUP_TABLE",
                )?,
                nullify_table: parse_pubkey(
                    &args.nullified_state_tree_lookup_table,
                    "NULLIFIED_STATE_TREE_LOOKUP_TABLE",
                )?,
            },
        })
    }

    pub fn explorer_link(&self, signature: &str) -> String {
        format!("{}{}", self.explorer_url, signature)
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ConfigError::NotSet { name }),
    }
}

fn parse_pubkey(value: &str, field: &'static str) -> Result<Pubkey, ConfigError> {
    Pubkey::from_str(value.trim()).map_err(|e| ConfigError::InvalidPubkey {
        field,
        error: e.to_string(),
    })
}
