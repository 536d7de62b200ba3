use solana_sdk::{
    derivation_path::DerivationPath,
    signature::Keypair,
    signer::keypair::{
        generate_seed_from_seed_phrase_and_passphrase, keypair_from_seed_and_derivation_path,
    },
};
use tracing::debug;

use crate::{constants::DERIVATION_PATH, errors::WalletError};

/// Derives the signing keypair from a bip39 seed phrase at `m/44'/501'/0'/0'`,
/// the path used by Phantom and Solflare for the first account.
pub fn load_wallet(seed_phrase: Option<&str>) -> Result<Keypair, WalletError> {
    load_wallet_with_path(seed_phrase, DERIVATION_PATH)
}

pub fn load_wallet_with_path(
    seed_phrase: Option<&str>,
    derivation_path: &str,
) -> Result<Keypair, WalletError> {
    let seed_phrase = seed_phrase
        .map(normalize_seed_phrase)
        .filter(|phrase| !phrase.is_empty())
        .ok_or(WalletError::SeedPhraseNotSet)?;

    let path = DerivationPath::from_absolute_path_str(derivation_path).map_err(|e| {
        WalletError::Derivation {
            reason: e.to_string(),
        }
    })?;

    let seed = generate_seed_from_seed_phrase_and_passphrase(&seed_phrase, "");
    let keypair = keypair_from_seed_and_derivation_path(&seed, Some(path)).map_err(|e| {
        WalletError::Derivation {
            reason: e.to_string(),
        }
    })?;
    debug!("Derived wallet at {}", derivation_path);
    Ok(keypair)
}

/// Collapses runs of whitespace so phrases pasted with line breaks derive
/// the same seed.
fn normalize_seed_phrase(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}
