use solana_sdk::pubkey::Pubkey;

use super::IndexerError;

pub fn decode_base58_to_fixed_array<const N: usize>(
    field: &str,
    input: &str,
) -> Result<[u8; N], IndexerError> {
    let mut buffer = [0u8; N];
    let decoded_len = bs58::decode(input)
        .onto(&mut buffer)
        .map_err(|e| IndexerError::base58_decode_error(field, e))?;

    if decoded_len != N {
        return Err(IndexerError::base58_decode_error(
            field,
            format!("expected {} bytes, got {}", N, decoded_len),
        ));
    }

    Ok(buffer)
}

pub fn decode_base58_to_pubkey(field: &str, input: &str) -> Result<Pubkey, IndexerError> {
    decode_base58_to_fixed_array(field, input).map(Pubkey::new_from_array)
}

pub fn decode_base58_option_to_pubkey(
    field: &str,
    value: &Option<String>,
) -> Result<Option<Pubkey>, IndexerError> {
    value
        .as_ref()
        .map(|v| decode_base58_to_pubkey(field, v))
        .transpose()
}
