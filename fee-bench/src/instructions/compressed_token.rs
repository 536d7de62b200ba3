//! Client side of the compressed-token program's `transfer` instruction.
//!
//! The same instruction compresses (SPL account -> compressed output),
//! transfers (compressed inputs -> compressed outputs) and decompresses.
//! Trees, queues and delegates are passed as remaining accounts and referred
//! to by index from the instruction data.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    hash::hash,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::{
    constants::{
        ACCOUNT_COMPRESSION_PROGRAM_ID, COMPRESSED_TOKEN_PROGRAM_ID, CPI_AUTHORITY_SEED,
        LIGHT_SYSTEM_PROGRAM_ID, NOOP_PROGRAM_ID,
    },
    errors::InstructionError,
    indexer::{CompressedTokenAccount, ValidityProofWithContext},
};

/// Validity proofs exist for up to this many inputs per transfer.
pub const MAX_INPUT_ACCOUNTS: usize = 4;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedProof {
    pub a: [u8; 32],
    pub b: [u8; 64],
    pub c: [u8; 32],
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackedMerkleContext {
    pub merkle_tree_pubkey_index: u8,
    pub nullifier_queue_pubkey_index: u8,
    pub leaf_index: u32,
    pub prove_by_index: bool,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegatedTransfer {
    pub owner: Pubkey,
    pub delegate_change_account_index: Option<u8>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressedCpiContext {
    pub set_context: bool,
    pub first_set_context: bool,
    pub cpi_context_account_index: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct InputTokenDataWithContext {
    pub amount: u64,
    pub delegate_index: Option<u8>,
    pub merkle_context: PackedMerkleContext,
    pub root_index: u16,
    pub lamports: Option<u64>,
    pub tlv: Option<Vec<u8>>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackedTokenTransferOutputData {
    pub owner: Pubkey,
    pub amount: u64,
    pub lamports: Option<u64>,
    pub merkle_tree_index: u8,
    pub tlv: Option<Vec<u8>>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompressedTokenInstructionDataTransfer {
    pub proof: Option<CompressedProof>,
    pub mint: Pubkey,
    pub delegated_transfer: Option<DelegatedTransfer>,
    pub input_token_data_with_context: Vec<InputTokenDataWithContext>,
    pub output_compressed_accounts: Vec<PackedTokenTransferOutputData>,
    pub is_compress: bool,
    pub compress_or_decompress_amount: Option<u64>,
    pub cpi_context: Option<CompressedCpiContext>,
    pub lamports_change_account_merkle_tree_index: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTransferOutputData {
    pub owner: Pubkey,
    pub amount: u64,
    pub lamports: Option<u64>,
    pub merkle_tree: Pubkey,
}

/// A compressed token account to spend together with the queue its
/// nullifier is inserted into.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTokenAccount {
    pub account: CompressedTokenAccount,
    pub queue: Pubkey,
}

/// SPL side of a compress or decompress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    pub amount: u64,
    pub token_pool_pda: Pubkey,
    pub token_account: Pubkey,
}

/// Remaining accounts in insertion order, deduplicated.
#[derive(Debug, Default)]
pub struct PackedAccounts {
    accounts: Vec<Pubkey>,
}

impl PackedAccounts {
    pub fn insert_or_get(&mut self, pubkey: Pubkey) -> Result<u8, InstructionError> {
        let index = match self.accounts.iter().position(|account| *account == pubkey) {
            Some(index) => index,
            None => {
                self.accounts.push(pubkey);
                self.accounts.len() - 1
            }
        };
        u8::try_from(index).map_err(|_| InstructionError::TooManyAccounts)
    }

    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        self.accounts
            .iter()
            .map(|pubkey| AccountMeta::new(*pubkey, false))
            .collect()
    }
}

pub fn transfer_discriminator() -> [u8; 8] {
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash(b"global:transfer").to_bytes()[..8]);
    discriminator
}

pub fn get_cpi_authority_pda() -> Pubkey {
    Pubkey::find_program_address(&[CPI_AUTHORITY_SEED], &COMPRESSED_TOKEN_PROGRAM_ID).0
}

pub fn get_registered_program_pda() -> Pubkey {
    Pubkey::find_program_address(
        &[LIGHT_SYSTEM_PROGRAM_ID.as_ref()],
        &ACCOUNT_COMPRESSION_PROGRAM_ID,
    )
    .0
}

pub fn get_account_compression_authority() -> Pubkey {
    Pubkey::find_program_address(&[CPI_AUTHORITY_SEED], &LIGHT_SYSTEM_PROGRAM_ID).0
}

/// Packs inputs and outputs into instruction data. Input trees are inserted
/// first, then their queues, then output trees.
pub fn create_inputs_and_remaining_accounts(
    inputs: &[InputTokenAccount],
    root_indices: &[u16],
    outputs: &[TokenTransferOutputData],
    proof: Option<CompressedProof>,
    mint: Pubkey,
    compression: Option<&Compression>,
) -> Result<(PackedAccounts, CompressedTokenInstructionDataTransfer), InstructionError> {
    if root_indices.len() != inputs.len() {
        return Err(InstructionError::AccountCountMismatch {
            proof: root_indices.len(),
            expected: inputs.len(),
        });
    }

    let mut remaining_accounts = PackedAccounts::default();
    let mut input_token_data_with_context = Vec::with_capacity(inputs.len());
    for (input, root_index) in inputs.iter().zip(root_indices) {
        let merkle_tree_pubkey_index = remaining_accounts.insert_or_get(input.account.tree)?;
        let delegate_index = input
            .account
            .delegate
            .map(|delegate| remaining_accounts.insert_or_get(delegate))
            .transpose()?;
        input_token_data_with_context.push(InputTokenDataWithContext {
            amount: input.account.amount,
            delegate_index,
            merkle_context: PackedMerkleContext {
                merkle_tree_pubkey_index,
                nullifier_queue_pubkey_index: 0,
                leaf_index: input.account.leaf_index,
                prove_by_index: false,
            },
            root_index: *root_index,
            lamports: (input.account.lamports > 0).then_some(input.account.lamports),
            tlv: None,
        });
    }
    for (input, data) in inputs.iter().zip(input_token_data_with_context.iter_mut()) {
        data.merkle_context.nullifier_queue_pubkey_index =
            remaining_accounts.insert_or_get(input.queue)?;
    }

    let output_compressed_accounts = outputs
        .iter()
        .map(|output| {
            Ok(PackedTokenTransferOutputData {
                owner: output.owner,
                amount: output.amount,
                lamports: output.lamports,
                merkle_tree_index: remaining_accounts.insert_or_get(output.merkle_tree)?,
                tlv: None,
            })
        })
        .collect::<Result<Vec<_>, InstructionError>>()?;

    let data = CompressedTokenInstructionDataTransfer {
        proof,
        mint,
        delegated_transfer: None,
        input_token_data_with_context,
        output_compressed_accounts,
        is_compress: compression.is_some(),
        compress_or_decompress_amount: compression.map(|compression| compression.amount),
        cpi_context: None,
        lamports_change_account_merkle_tree_index: None,
    };
    Ok((remaining_accounts, data))
}

#[allow(clippy::too_many_arguments)]
pub fn create_transfer_instruction(
    fee_payer: &Pubkey,
    authority: &Pubkey,
    inputs: &[InputTokenAccount],
    root_indices: &[u16],
    outputs: &[TokenTransferOutputData],
    proof: Option<CompressedProof>,
    mint: Pubkey,
    compression: Option<Compression>,
) -> Result<Instruction, InstructionError> {
    let (remaining_accounts, inputs_struct) = create_inputs_and_remaining_accounts(
        inputs,
        root_indices,
        outputs,
        proof,
        mint,
        compression.as_ref(),
    )?;

    let inputs = inputs_struct
        .try_to_vec()
        .map_err(|e| InstructionError::Serialization(e.to_string()))?;
    let mut data = transfer_discriminator().to_vec();
    inputs
        .serialize(&mut data)
        .map_err(|e| InstructionError::Serialization(e.to_string()))?;

    // Unset optional accounts are passed as the program id.
    let optional = |pubkey: Option<Pubkey>| match pubkey {
        Some(pubkey) => AccountMeta::new(pubkey, false),
        None => AccountMeta::new_readonly(COMPRESSED_TOKEN_PROGRAM_ID, false),
    };
    let accounts = vec![
        AccountMeta::new(*fee_payer, true),
        AccountMeta::new_readonly(*authority, true),
        AccountMeta::new_readonly(get_cpi_authority_pda(), false),
        AccountMeta::new_readonly(LIGHT_SYSTEM_PROGRAM_ID, false),
        AccountMeta::new_readonly(get_registered_program_pda(), false),
        AccountMeta::new_readonly(NOOP_PROGRAM_ID, false),
        AccountMeta::new_readonly(get_account_compression_authority(), false),
        AccountMeta::new_readonly(ACCOUNT_COMPRESSION_PROGRAM_ID, false),
        AccountMeta::new_readonly(COMPRESSED_TOKEN_PROGRAM_ID, false),
        optional(compression.map(|c| c.token_pool_pda)),
        optional(compression.map(|c| c.token_account)),
        match compression {
            Some(_) => AccountMeta::new_readonly(spl_token::ID, false),
            None => AccountMeta::new_readonly(COMPRESSED_TOKEN_PROGRAM_ID, false),
        },
        AccountMeta::new_readonly(system_program::ID, false),
    ];

    Ok(Instruction {
        program_id: COMPRESSED_TOKEN_PROGRAM_ID,
        accounts: [accounts, remaining_accounts.to_account_metas()].concat(),
        data,
    })
}

/// Compresses `amount` from `token_account` into a single compressed
/// output owned by `owner` in `output_tree`.
pub fn create_compress_instruction(
    fee_payer: &Pubkey,
    owner: &Pubkey,
    token_account: &Pubkey,
    mint: &Pubkey,
    amount: u64,
    output_tree: &Pubkey,
    token_pool_pda: &Pubkey,
) -> Result<Instruction, InstructionError> {
    let output = TokenTransferOutputData {
        owner: *owner,
        amount,
        lamports: None,
        merkle_tree: *output_tree,
    };
    create_transfer_instruction(
        fee_payer,
        owner,
        &[],
        &[],
        &[output],
        None,
        *mint,
        Some(Compression {
            amount,
            token_pool_pda: *token_pool_pda,
            token_account: *token_account,
        }),
    )
}

/// Transfers `amount` to `recipient` from the given inputs, returning any
/// remainder to `owner`. Both outputs go to `output_tree`.
#[allow(clippy::too_many_arguments)]
pub fn create_compressed_transfer_instruction(
    fee_payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    inputs: &[InputTokenAccount],
    proof: &ValidityProofWithContext,
    recipient: &Pubkey,
    amount: u64,
    output_tree: &Pubkey,
) -> Result<Instruction, InstructionError> {
    let available: u64 = inputs.iter().map(|input| input.account.amount).sum();
    let change = available
        .checked_sub(amount)
        .ok_or(InstructionError::InsufficientBalance {
            required: amount,
            available,
        })?;

    let mut outputs = vec![TokenTransferOutputData {
        owner: *recipient,
        amount,
        lamports: None,
        merkle_tree: *output_tree,
    }];
    if change > 0 {
        outputs.push(TokenTransferOutputData {
            owner: *owner,
            amount: change,
            lamports: None,
            merkle_tree: *output_tree,
        });
    }

    create_transfer_instruction(
        fee_payer,
        owner,
        inputs,
        &proof.root_indices,
        &outputs,
        proof.compressed_proof,
        *mint,
        None,
    )
}

/// Picks inputs largest first until they cover `amount`.
pub fn select_input_accounts(
    accounts: &[CompressedTokenAccount],
    amount: u64,
) -> Result<Vec<CompressedTokenAccount>, InstructionError> {
    let mut sorted = accounts.to_vec();
    sorted.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mut selected = Vec::new();
    let mut total = 0u64;
    for account in sorted {
        if total >= amount {
            break;
        }
        total = total.saturating_add(account.amount);
        selected.push(account);
    }

    if total < amount {
        return Err(InstructionError::InsufficientBalance {
            required: amount,
            available: total,
        });
    }
    if selected.len() > MAX_INPUT_ACCOUNTS {
        return Err(InstructionError::TooManyInputs {
            max: MAX_INPUT_ACCOUNTS,
        });
    }
    Ok(selected)
}

/// Inverse of the data layout written by `create_transfer_instruction`.
pub fn decode_transfer_instruction_data(
    data: &[u8],
) -> Result<CompressedTokenInstructionDataTransfer, InstructionError> {
    let (discriminator, mut rest) = data.split_at(data.len().min(8));
    if discriminator != transfer_discriminator() {
        return Err(InstructionError::InvalidData(
            "not a compressed token transfer".to_string(),
        ));
    }
    let inputs = Vec::<u8>::deserialize(&mut rest)
        .map_err(|e| InstructionError::InvalidData(e.to_string()))?;
    CompressedTokenInstructionDataTransfer::try_from_slice(&inputs)
        .map_err(|e| InstructionError::InvalidData(e.to_string()))
}
