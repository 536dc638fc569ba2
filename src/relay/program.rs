//! 中继合约地址推导与指令构建

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::common::Network;
use crate::constants::{SYSTEM_PROGRAM, SYSVAR_RENT, TOKEN_PROGRAM};

/// 指令索引
pub mod index {
    pub const TRANSFER_SOL: u8 = 2;
    pub const CREATE_TRANSIT_TOKEN: u8 = 3;
}

const RELAY_SEED: &[u8] = b"relay";
const TRANSIT_SEED: &[u8] = b"transit";

/// Relay program bound to one cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayProgram {
    network: Network,
}

impl RelayProgram {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    #[inline]
    pub fn id(&self) -> Pubkey {
        self.network.relay_program_id()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The custodial account the relay draws network fees from
    pub fn user_relay_address(&self, user: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(&[user.as_ref(), RELAY_SEED], &self.id()).0
    }

    /// Holding account for the intermediate token of a two-hop swap
    pub fn transit_token_account_address(&self, user: &Pubkey, transit_token_mint: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[user.as_ref(), transit_token_mint.as_ref(), TRANSIT_SEED],
            &self.id(),
        )
        .0
    }

    /// Move `lamports` out of the user's relay account to `recipient`
    pub fn transfer_sol_instruction(&self, user_authority: &Pubkey, recipient: &Pubkey, lamports: u64) -> Instruction {
        let mut data = Vec::with_capacity(9);
        data.push(index::TRANSFER_SOL);
        data.extend_from_slice(&lamports.to_le_bytes());

        Instruction {
            program_id: self.id(),
            accounts: vec![
                AccountMeta::new_readonly(*user_authority, true),
                AccountMeta::new(self.user_relay_address(user_authority), false),
                AccountMeta::new(*recipient, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM, false),
            ],
            data,
        }
    }

    pub fn create_transit_token_account_instruction(
        &self,
        fee_payer: &Pubkey,
        user_authority: &Pubkey,
        transit_token_account: &Pubkey,
        transit_token_mint: &Pubkey,
    ) -> Instruction {
        Instruction {
            program_id: self.id(),
            accounts: vec![
                AccountMeta::new(*transit_token_account, false),
                AccountMeta::new_readonly(*transit_token_mint, false),
                AccountMeta::new(*user_authority, true),
                AccountMeta::new_readonly(*fee_payer, true),
                AccountMeta::new_readonly(TOKEN_PROGRAM, false),
                AccountMeta::new_readonly(SYSVAR_RENT, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM, false),
            ],
            data: vec![index::CREATE_TRANSIT_TOKEN],
        }
    }
}

impl Default for RelayProgram {
    fn default() -> Self {
        Self::new(Network::MainnetBeta)
    }
}
