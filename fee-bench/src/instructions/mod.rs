pub mod compressed_token;
pub mod token_pool;
pub mod wrap;
