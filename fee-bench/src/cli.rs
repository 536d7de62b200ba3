use clap::Parser;

use crate::constants::{
    DEFAULT_COMPRESS_CU_LIMIT, DEFAULT_EXPLORER_URL, DEFAULT_TRANSFER_CU_LIMIT,
    NULLIFIED_STATE_TREE_LOOKUP_TABLE_MAINNET, STATE_TREE_LOOKUP_TABLE_MAINNET,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub args: BenchArgs,
}

/// Required values are optional here so that a missing one surfaces as a
/// `ConfigError::NotSet` from `BenchConfig::from_args` instead of a clap usage error.
#[derive(Parser, Clone, Debug)]
pub struct BenchArgs {
    #[arg(long, env = "HELIUS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "SEED_PHRASE", hide_env_values = true)]
    pub seed_phrase: Option<String>,

    #[arg(long, env = "RECIPIENT_ADDRESS")]
    pub recipient: Option<String>,

    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    #[arg(long, env = "INDEXER_URL")]
    pub indexer_url: Option<String>,

    #[arg(long, env = "EXPLORER_URL", default_value = DEFAULT_EXPLORER_URL)]
    pub explorer_url: String,

    #[arg(long, env = "PROBE_DELAY_SECS", default_value = "5")]
    pub probe_delay_secs: u64,

    #[arg(long, env = "COMPRESS_CU_LIMIT", default_value_t = DEFAULT_COMPRESS_CU_LIMIT)]
    pub compress_cu_limit: u32,

    #[arg(long, env = "TRANSFER_CU_LIMIT", default_value_t = DEFAULT_TRANSFER_CU_LIMIT)]
    pub transfer_cu_limit: u32,

    #[arg(long, env = "INDEXER_SYNC_TIMEOUT_SECS", default_value = "30")]
    pub indexer_sync_timeout_secs: u64,

    #[arg(
        long,
        env = "STATE_TREE_LOOKUP_TABLE",
        default_value = STATE_TREE_LOOKUP_TABLE_MAINNET
    )]
    pub state_tree_lookup_table: String,

    #[arg(
        long,
        env = "NULLIFIED_STATE_TREE_LOOKUP_TABLE",
        default_value = NULLIFIED_STATE_TREE_LOOKUP_TABLE_MAINNET
    )]
    pub nullified_state_tree_lookup_table: String,
}
