#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use clap::Parser;
use light_fee_bench::{
    cli::BenchArgs,
    config::BenchConfig,
    constants::{COMPRESSED_TOKEN_PROGRAM_ID, TEST_AMOUNT_SOL},
    indexer::{CompressedTokenAccount, Indexer, IndexerError, ValidityProofWithContext},
    instructions::{
        compressed_token::{
            decode_transfer_instruction_data, get_cpi_authority_pda, CompressedProof,
        },
        token_pool::find_token_pool_pda_with_index,
    },
    rpc::{RpcConnection, RpcError},
    wallet::load_wallet,
};
use solana_sdk::{
    account::Account,
    compute_budget,
    hash::Hash,
    native_token::LAMPORTS_PER_SOL,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Signature, Signer},
    system_program,
    transaction::Transaction,
};
use spl_token::{
    instruction::TokenInstruction,
    native_mint,
    state::{Account as SplTokenAccount, AccountState},
};

pub const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub const DEFAULT_FEE: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct RecordedInstruction {
    pub program_id: Pubkey,
    pub accounts: Vec<Pubkey>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordedTransaction {
    pub signature: Signature,
    pub slot: u64,
    pub fee: u64,
    pub instructions: Vec<RecordedInstruction>,
}

impl RecordedTransaction {
    pub fn program_ids(&self) -> Vec<Pubkey> {
        self.instructions.iter().map(|ix| ix.program_id).collect()
    }
}

/// Balances and compressed state. Transactions apply to a copy that is only
/// committed when every instruction succeeds.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub accounts: HashMap<Pubkey, Account>,
    pub token_balances: HashMap<Pubkey, u64>,
    pub compressed_accounts: Vec<CompressedTokenAccount>,
    pub next_leaf_index: u32,
    pub next_hash: u64,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub ledger: Ledger,
    pub lookup_tables: HashMap<Pubkey, Vec<Pubkey>>,
    pub transactions: Vec<RecordedTransaction>,
    pub fees: VecDeque<u64>,
    pub fail_send_at: Option<usize>,
    pub fail_confirm: bool,
    pub confirmations: usize,
    pub slot: u64,
    /// `None` keeps the indexer in sync with the chain. `Some(step)` makes it
    /// report its own slot and advance by `step` after each query.
    pub indexer_step: Option<u64>,
    pub indexer_slot: u64,
    pub lagging_polls: usize,
    /// Indexer slot at each token account query.
    pub token_account_reads: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct FakeRpc {
    pub state: Arc<Mutex<FakeState>>,
}

#[derive(Debug, Clone)]
pub struct FakeIndexer {
    pub state: Arc<Mutex<FakeState>>,
}

/// Ids of the fake's state trees and lookup tables.
#[derive(Debug, Clone, Copy)]
pub struct FakeTrees {
    pub state_tree_lookup_table: Pubkey,
    pub nullify_table: Pubkey,
    pub retired_tree: Pubkey,
    pub tree: Pubkey,
    pub queue: Pubkey,
}

pub struct FakeBackend {
    pub rpc: FakeRpc,
    pub indexer: FakeIndexer,
    pub state: Arc<Mutex<FakeState>>,
    pub trees: FakeTrees,
    pub wallet: Pubkey,
    pub recipient: Pubkey,
}

impl FakeBackend {
    pub fn new() -> Self {
        let wallet = load_wallet(Some(PHRASE)).unwrap().pubkey();
        let recipient = Pubkey::new_unique();
        let trees = FakeTrees {
            state_tree_lookup_table: Pubkey::new_unique(),
            nullify_table: Pubkey::new_unique(),
            retired_tree: Pubkey::new_unique(),
            tree: Pubkey::new_unique(),
            queue: Pubkey::new_unique(),
        };

        let mut state = FakeState::default();
        state.lookup_tables.insert(
            trees.state_tree_lookup_table,
            vec![
                trees.retired_tree,
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                trees.tree,
                trees.queue,
                Pubkey::new_unique(),
            ],
        );
        state
            .lookup_tables
            .insert(trees.nullify_table, vec![trees.retired_tree]);
        state.ledger.accounts.insert(
            wallet,
            Account {
                lamports: 10 * LAMPORTS_PER_SOL,
                owner: system_program::ID,
                ..Account::default()
            },
        );

        let token_pool_pda = find_token_pool_pda_with_index(&native_mint::ID, 0).0;
        let mut data = vec![0u8; SplTokenAccount::LEN];
        SplTokenAccount::pack(
            SplTokenAccount {
                mint: native_mint::ID,
                owner: get_cpi_authority_pda(),
                state: AccountState::Initialized,
                ..SplTokenAccount::default()
            },
            &mut data,
        )
        .unwrap();
        state.ledger.accounts.insert(
            token_pool_pda,
            Account {
                lamports: LAMPORTS_PER_SOL,
                owner: spl_token::ID,
                data,
                ..Account::default()
            },
        );

        let state = Arc::new(Mutex::new(state));
        Self {
            rpc: FakeRpc {
                state: state.clone(),
            },
            indexer: FakeIndexer {
                state: state.clone(),
            },
            state,
            trees,
            wallet,
            recipient,
        }
    }

    pub fn args(&self) -> BenchArgs {
        BenchArgs::parse_from(vec![
            "light-fee-bench".to_string(),
            "--api-key".to_string(),
            "test-key".to_string(),
            "--seed-phrase".to_string(),
            PHRASE.to_string(),
            "--recipient".to_string(),
            self.recipient.to_string(),
            "--probe-delay-secs".to_string(),
            "0".to_string(),
            "--indexer-sync-timeout-secs".to_string(),
            "5".to_string(),
            "--state-tree-lookup-table".to_string(),
            self.trees.state_tree_lookup_table.to_string(),
            "--nullified-state-tree-lookup-table".to_string(),
            self.trees.nullify_table.to_string(),
        ])
    }

    pub fn config(&self) -> BenchConfig {
        BenchConfig::from_args(&self.args()).unwrap()
    }

    pub fn queue_fees(&self, fees: &[u64]) {
        self.state.lock().unwrap().fees.extend(fees);
    }

    pub fn transactions(&self) -> Vec<RecordedTransaction> {
        self.state.lock().unwrap().transactions.clone()
    }

    pub fn lamports(&self, pubkey: &Pubkey) -> u64 {
        self.state
            .lock()
            .unwrap()
            .ledger
            .accounts
            .get(pubkey)
            .map(|account| account.lamports)
            .unwrap_or_default()
    }

    pub fn compressed_balance(&self, owner: &Pubkey) -> u64 {
        self.state
            .lock()
            .unwrap()
            .ledger
            .compressed_accounts
            .iter()
            .filter(|account| account.owner == *owner)
            .map(|account| account.amount)
            .sum()
    }
}

pub fn test_amount() -> u64 {
    (TEST_AMOUNT_SOL * LAMPORTS_PER_SOL as f64) as u64
}

fn fake_error(message: impl Into<String>) -> RpcError {
    RpcError::CustomError(message.into())
}

impl Ledger {
    fn debit(&mut self, pubkey: &Pubkey, lamports: u64) -> Result<(), RpcError> {
        let account = self
            .accounts
            .get_mut(pubkey)
            .ok_or_else(|| fake_error(format!("{} does not exist", pubkey)))?;
        account.lamports = account
            .lamports
            .checked_sub(lamports)
            .ok_or_else(|| fake_error(format!("{} has insufficient lamports", pubkey)))?;
        Ok(())
    }

    fn credit(&mut self, pubkey: &Pubkey, lamports: u64) {
        self.accounts
            .entry(*pubkey)
            .or_insert_with(|| Account {
                owner: system_program::ID,
                ..Account::default()
            })
            .lamports += lamports;
    }

    fn apply(&mut self, instruction: &RecordedInstruction) -> Result<(), RpcError> {
        let program_id = instruction.program_id;
        if program_id == compute_budget::ID {
            return Ok(());
        }
        if program_id == system_program::ID {
            let data = &instruction.data;
            if data.len() != 12 || data[..4] != [2, 0, 0, 0] {
                return Err(fake_error("unsupported system instruction"));
            }
            let mut amount = [0u8; 8];
            amount.copy_from_slice(&data[4..]);
            let lamports = u64::from_le_bytes(amount);
            self.debit(&instruction.accounts[0], lamports)?;
            self.credit(&instruction.accounts[1], lamports);
        } else if program_id == spl_associated_token_account::ID {
            let token_account = instruction.accounts[1];
            if self.accounts.contains_key(&token_account) {
                return Err(fake_error("token account already exists"));
            }
            self.accounts.insert(
                token_account,
                Account {
                    owner: spl_token::ID,
                    data: vec![0u8; SplTokenAccount::LEN],
                    ..Account::default()
                },
            );
            self.token_balances.insert(token_account, 0);
        } else if program_id == spl_token::ID {
            if !matches!(
                TokenInstruction::unpack(&instruction.data),
                Ok(TokenInstruction::SyncNative)
            ) {
                return Err(fake_error("unsupported token instruction"));
            }
            let token_account = instruction.accounts[0];
            let lamports = self
                .accounts
                .get(&token_account)
                .map(|account| account.lamports)
                .ok_or_else(|| fake_error("sync_native on missing account"))?;
            self.token_balances.insert(token_account, lamports);
        } else if program_id == COMPRESSED_TOKEN_PROGRAM_ID {
            self.apply_compressed_token(instruction)?;
        } else {
            return Err(fake_error(format!("unknown program {}", program_id)));
        }
        Ok(())
    }

    fn apply_compressed_token(&mut self, instruction: &RecordedInstruction) -> Result<(), RpcError> {
        let data = decode_transfer_instruction_data(&instruction.data)
            .map_err(|e| fake_error(e.to_string()))?;
        let authority = instruction.accounts[1];
        let remaining = &instruction.accounts[13..];

        let mut input_sum = 0u64;
        for input in data.input_token_data_with_context.iter() {
            let tree = remaining[input.merkle_context.merkle_tree_pubkey_index as usize];
            let position = self
                .compressed_accounts
                .iter()
                .position(|account| {
                    account.tree == tree && account.leaf_index == input.merkle_context.leaf_index
                })
                .ok_or_else(|| fake_error("input compressed account not found"))?;
            let spent = self.compressed_accounts.remove(position);
            if spent.owner != authority || spent.amount != input.amount {
                return Err(fake_error("input does not match compressed account"));
            }
            input_sum += spent.amount;
        }

        let output_sum: u64 = data
            .output_compressed_accounts
            .iter()
            .map(|output| output.amount)
            .sum();
        if data.is_compress {
            let amount = data
                .compress_or_decompress_amount
                .ok_or_else(|| fake_error("compress without amount"))?;
            let token_account = instruction.accounts[10];
            let balance = self
                .token_balances
                .get_mut(&token_account)
                .ok_or_else(|| fake_error("compress from missing token account"))?;
            *balance = balance
                .checked_sub(amount)
                .ok_or_else(|| fake_error("insufficient token balance"))?;
            self.debit(&token_account, amount)?;
            self.credit(&instruction.accounts[9], amount);
            input_sum += amount;
        }
        if input_sum != output_sum {
            return Err(fake_error(format!(
                "inputs {} do not match outputs {}",
                input_sum, output_sum
            )));
        }

        for output in data.output_compressed_accounts.iter() {
            self.next_hash += 1;
            let mut hash = [0u8; 32];
            hash[..8].copy_from_slice(&self.next_hash.to_le_bytes());
            self.compressed_accounts.push(CompressedTokenAccount {
                hash,
                tree: remaining[output.merkle_tree_index as usize],
                leaf_index: self.next_leaf_index,
                lamports: 0,
                mint: data.mint,
                owner: output.owner,
                amount: output.amount,
                delegate: None,
            });
            self.next_leaf_index += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl RpcConnection for FakeRpc {
    async fn get_account(&self, address: Pubkey) -> Result<Option<Account>, RpcError> {
        Ok(self.state.lock().unwrap().ledger.accounts.get(&address).cloned())
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, RpcError> {
        let state = self.state.lock().unwrap();
        Ok(addresses
            .iter()
            .map(|address| state.ledger.accounts.get(address).cloned())
            .collect())
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, RpcError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .ledger
            .accounts
            .get(pubkey)
            .map(|account| account.lamports)
            .unwrap_or_default())
    }

    async fn get_latest_blockhash(&mut self) -> Result<Hash, RpcError> {
        Ok(Hash::new_unique())
    }

    async fn process_transaction(
        &mut self,
        transaction: Transaction,
    ) -> Result<Signature, RpcError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_send_at == Some(state.transactions.len()) {
            return Err(fake_error("send failed"));
        }
        transaction.verify()?;

        let message = &transaction.message;
        let instructions: Vec<RecordedInstruction> = message
            .instructions
            .iter()
            .map(|ix| RecordedInstruction {
                program_id: message.account_keys[ix.program_id_index as usize],
                accounts: ix
                    .accounts
                    .iter()
                    .map(|index| message.account_keys[*index as usize])
                    .collect(),
                data: ix.data.clone(),
            })
            .collect();

        let fee = state.fees.pop_front().unwrap_or(DEFAULT_FEE);
        let mut ledger = state.ledger.clone();
        ledger.debit(&message.account_keys[0], fee)?;
        for instruction in instructions.iter() {
            ledger.apply(instruction)?;
        }

        state.ledger = ledger;
        state.slot += 1;
        let signature = transaction.signatures[0];
        let slot = state.slot;
        state.transactions.push(RecordedTransaction {
            signature,
            slot,
            fee,
            instructions,
        });
        Ok(signature)
    }

    async fn confirm_transaction(&self, signature: Signature) -> Result<bool, RpcError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_confirm {
            return Err(fake_error("confirmation timed out"));
        }
        if !state
            .transactions
            .iter()
            .any(|transaction| transaction.signature == signature)
        {
            return Err(RpcError::TransactionNotFound(signature));
        }
        state.confirmations += 1;
        Ok(true)
    }

    async fn get_transaction_slot(&self, signature: &Signature) -> Result<u64, RpcError> {
        self.state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .find(|transaction| transaction.signature == *signature)
            .map(|transaction| transaction.slot)
            .ok_or(RpcError::TransactionNotFound(*signature))
    }

    async fn get_transaction_fee(&self, signature: &Signature) -> Result<u64, RpcError> {
        self.state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .find(|transaction| transaction.signature == *signature)
            .map(|transaction| transaction.fee)
            .ok_or(RpcError::TransactionNotFound(*signature))
    }

    async fn get_address_lookup_table(&self, address: &Pubkey) -> Result<Vec<Pubkey>, RpcError> {
        self.state
            .lock()
            .unwrap()
            .lookup_tables
            .get(address)
            .cloned()
            .ok_or_else(|| RpcError::InvalidLookupTable(address.to_string()))
    }
}

#[async_trait]
impl Indexer for FakeIndexer {
    async fn get_indexer_slot(&self) -> Result<u64, IndexerError> {
        let mut state = self.state.lock().unwrap();
        let Some(step) = state.indexer_step else {
            return Ok(state.slot);
        };
        let reported = state.indexer_slot;
        if reported < state.slot {
            state.lagging_polls += 1;
        }
        state.indexer_slot = (reported + step).min(state.slot);
        Ok(reported)
    }

    async fn get_compressed_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: Option<&Pubkey>,
    ) -> Result<Vec<CompressedTokenAccount>, IndexerError> {
        let mut state = self.state.lock().unwrap();
        let indexed = match state.indexer_step {
            Some(_) => state.indexer_slot,
            None => state.slot,
        };
        state.token_account_reads.push(indexed);
        let accounts = state
            .ledger
            .compressed_accounts
            .iter()
            .filter(|account| account.owner == *owner)
            .filter(|account| mint.map_or(true, |mint| account.mint == *mint))
            .cloned()
            .collect();
        Ok(accounts)
    }

    async fn get_validity_proof(
        &self,
        hashes: Vec<[u8; 32]>,
    ) -> Result<ValidityProofWithContext, IndexerError> {
        let state = self.state.lock().unwrap();
        let accounts = hashes
            .iter()
            .map(|hash| {
                state
                    .ledger
                    .compressed_accounts
                    .iter()
                    .find(|account| account.hash == *hash)
                    .ok_or_else(|| IndexerError::InvalidResponseData("unknown hash".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ValidityProofWithContext {
            compressed_proof: Some(CompressedProof {
                a: [0u8; 32],
                b: [0u8; 64],
                c: [0u8; 32],
            }),
            root_indices: vec![0; accounts.len()],
            leaf_indices: accounts.iter().map(|account| account.leaf_index).collect(),
            merkle_trees: accounts.iter().map(|account| account.tree).collect(),
        })
    }
}
