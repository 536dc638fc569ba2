use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use spl_token::solana_program::program_pack::Pack;

use super::program::RelayProgram;
use crate::common::{AccountLookup, RelayResult};
use crate::constants::TOKEN_PROGRAM;
use crate::swap::Pool;
use crate::utils::token::TokenRegistry;

/// A resolved SPL token account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAccount {
    pub address: Pubkey,
    pub mint: Pubkey,
}

/// 中转代币账户管理
///
/// 两跳兑换经过中继时，中间代币需要一个临时的中转账户。这里只负责判断
/// 中转 mint、推导地址以及检测是否需要创建，创建本身由交易组装层完成。
#[async_trait]
pub trait TransitTokenAccountManager: Send + Sync {
    /// Mint of the intermediate token of a two-pool route
    fn get_transit_token_mint_pubkey(&self, pools: &[Pool]) -> Option<Pubkey>;

    fn get_transit_token(&self, pools: &[Pool]) -> Option<TokenAccount>;

    async fn check_if_needs_create_transit_token_account(&self, transit_token: &TokenAccount) -> RelayResult<bool>;
}

pub struct DefaultTransitTokenAccountManager<L, R> {
    owner: Pubkey,
    program: RelayProgram,
    lookup: L,
    registry: R,
}

impl<L: AccountLookup, R: TokenRegistry> DefaultTransitTokenAccountManager<L, R> {
    pub fn new(owner: Pubkey, program: RelayProgram, lookup: L, registry: R) -> Self {
        Self { owner, program, lookup, registry }
    }

    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }
}

#[async_trait]
impl<L: AccountLookup, R: TokenRegistry> TransitTokenAccountManager for DefaultTransitTokenAccountManager<L, R> {
    fn get_transit_token_mint_pubkey(&self, pools: &[Pool]) -> Option<Pubkey> {
        let [first, _] = pools else {
            return None;
        };
        self.registry.mint_address(&first.token_b_name)
    }

    fn get_transit_token(&self, pools: &[Pool]) -> Option<TokenAccount> {
        let mint = self.get_transit_token_mint_pubkey(pools)?;
        let address = self.program.transit_token_account_address(&self.owner, &mint);
        Some(TokenAccount { address, mint })
    }

    async fn check_if_needs_create_transit_token_account(&self, transit_token: &TokenAccount) -> RelayResult<bool> {
        let Some(account) = self.lookup.fetch_account(&transit_token.address).await? else {
            return Ok(true);
        };

        if account.owner != TOKEN_PROGRAM {
            tracing::warn!("transit account {} is owned by {}", transit_token.address, account.owner);
            return Ok(true);
        }

        match spl_token::state::Account::unpack(&account.data) {
            Ok(state) => Ok(state.mint != transit_token.mint),
            Err(e) => {
                tracing::warn!("transit account {} is not a token account: {}", transit_token.address, e);
                Ok(true)
            }
        }
    }
}
