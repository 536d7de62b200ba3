use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};
use spl_token::native_mint;

use crate::errors::InstructionError;

/// The wallet's wSOL account.
pub fn wsol_token_account(owner: &Pubkey) -> Pubkey {
    get_associated_token_address(owner, &native_mint::ID)
}

/// Funds the owner's wSOL account with `amount` lamports and syncs its token
/// balance, creating the account first when `create_account` is set.
pub fn create_wrap_sol_instructions(
    payer: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    create_account: bool,
) -> Result<Vec<Instruction>, InstructionError> {
    let token_account = wsol_token_account(owner);
    let mut instructions = Vec::with_capacity(3);
    if create_account {
        instructions.push(create_associated_token_account(
            payer,
            owner,
            &native_mint::ID,
            &spl_token::ID,
        ));
    }
    instructions.push(system_instruction::transfer(payer, &token_account, amount));
    instructions.push(spl_token::instruction::sync_native(
        &spl_token::ID,
        &token_account,
    )?);
    Ok(instructions)
}
