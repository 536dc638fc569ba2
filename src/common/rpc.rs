//! 链上查询边界
//!
//! 中继组件只依赖这里的两个窄 trait，生产环境由 `SolanaRpcClient` 实现，
//! 测试使用 [`crate::common::mock_rpc::MockAccountLookup`]。

use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

use super::error::RelayResult;
use super::types::SolanaRpcClient;

/// Single account lookup. `Ok(None)` means the account does not exist on chain.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn fetch_account(&self, address: &Pubkey) -> RelayResult<Option<Account>>;
}

/// Cluster-wide facts needed to build a relay context
#[async_trait]
pub trait ChainStateLookup: AccountLookup {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> RelayResult<u64>;

    /// Fee charged per signature on the current blockhash
    async fn lamports_per_signature(&self) -> RelayResult<u64>;
}

#[async_trait]
impl AccountLookup for SolanaRpcClient {
    async fn fetch_account(&self, address: &Pubkey) -> RelayResult<Option<Account>> {
        let response = self.get_account_with_commitment(address, self.commitment()).await?;
        Ok(response.value)
    }
}

#[async_trait]
impl ChainStateLookup for SolanaRpcClient {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> RelayResult<u64> {
        Ok(self.get_minimum_balance_for_rent_exemption(data_len).await?)
    }

    async fn lamports_per_signature(&self) -> RelayResult<u64> {
        // 单签名空消息的手续费即每个签名的费用
        let blockhash = self.get_latest_blockhash().await?;
        let message = Message::new_with_blockhash(&[], Some(&Pubkey::default()), &blockhash);
        Ok(self.get_fee_for_message(&message).await?)
    }
}

#[async_trait]
impl<T: AccountLookup + ?Sized> AccountLookup for Arc<T> {
    async fn fetch_account(&self, address: &Pubkey) -> RelayResult<Option<Account>> {
        (**self).fetch_account(address).await
    }
}

#[async_trait]
impl<T: ChainStateLookup + ?Sized> ChainStateLookup for Arc<T> {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> RelayResult<u64> {
        (**self).minimum_balance_for_rent_exemption(data_len).await
    }

    async fn lamports_per_signature(&self) -> RelayResult<u64> {
        (**self).lamports_per_signature().await
    }
}
