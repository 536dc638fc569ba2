//! Program ids and account sizes used by the relay flows.

use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const SYSTEM_PROGRAM: Pubkey = pubkey!("11111111111111111111111111111111");

/// SPL Token program (legacy, not Token-2022)
pub const TOKEN_PROGRAM: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

pub const ASSOCIATED_TOKEN_PROGRAM: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

pub const SYSVAR_RENT: Pubkey = pubkey!("SysvarRent111111111111111111111111111111111");

/// Relay program on mainnet-beta
pub const RELAY_PROGRAM_MAINNET: Pubkey = pubkey!("12YKFL4mnZz6CBEGePrf293mEzueQM3h8VLPUJsKpGs9");

/// Relay program on devnet (testnet shares the devnet deployment)
pub const RELAY_PROGRAM_DEVNET: Pubkey = pubkey!("6xKJFyuM6UHCT8F5SBxnjGt6ZrZYjsVfnAnAeHPU775k");

/// SPL token account data length
pub const TOKEN_ACCOUNT_LEN: usize = 165;

/// The relay account is a plain system account with no data
pub const RELAY_ACCOUNT_LEN: usize = 0;
