pub mod errors;
mod rpc_connection;
mod solana_rpc;

pub use errors::RpcError;
pub use rpc_connection::RpcConnection;
pub use solana_rpc::SolanaRpcConnection;
