//! 收款账户分析
//!
//! 判断转入资金真正落到哪个代币账户：WSOL 总是使用临时账户，
//! 其它代币使用 ATA，并根据链上状态判断是否需要先创建。

use async_trait::async_trait;
use futures::future::try_join_all;
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

use crate::common::{AccountLookup, RelayResult};
use crate::constants::{TOKEN_PROGRAM, WRAPPED_SOL_MINT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationInfo {
    /// A temporary wrapped-SOL account is created and closed after the transaction
    WsolAccount,
    /// The owner's associated token account
    SplAccount { needs_creation: bool },
}

impl DestinationInfo {
    pub fn needs_creation(&self) -> bool {
        match self {
            DestinationInfo::WsolAccount => true,
            DestinationInfo::SplAccount { needs_creation } => *needs_creation,
        }
    }
}

#[async_trait]
pub trait DestinationAnalyser: Send + Sync {
    async fn analyse_destination(&self, owner: &Pubkey, mint: &Pubkey) -> RelayResult<DestinationInfo>;

    /// Analyse several destinations concurrently. Results keep the input order; the
    /// first lookup error fails the whole batch.
    async fn analyse_destinations(&self, targets: &[(Pubkey, Pubkey)]) -> RelayResult<Vec<DestinationInfo>> {
        try_join_all(targets.iter().map(|(owner, mint)| self.analyse_destination(owner, mint))).await
    }
}

pub struct DefaultDestinationAnalyser<L> {
    lookup: L,
}

impl<L: AccountLookup> DefaultDestinationAnalyser<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl<L: AccountLookup> DestinationAnalyser for DefaultDestinationAnalyser<L> {
    async fn analyse_destination(&self, owner: &Pubkey, mint: &Pubkey) -> RelayResult<DestinationInfo> {
        if *mint == WRAPPED_SOL_MINT {
            return Ok(DestinationInfo::WsolAccount);
        }

        let address = get_associated_token_address(owner, mint);
        let needs_creation = match self.lookup.fetch_account(&address).await? {
            None => true,
            // 被其它程序占用的地址需要重新创建
            Some(account) => account.owner != TOKEN_PROGRAM,
        };

        Ok(DestinationInfo::SplAccount { needs_creation })
    }
}
