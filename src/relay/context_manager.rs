//! 中继上下文加载与缓存
//!
//! `update` 并发拉取租金、签名费用、中继账户余额、免费额度和 fee payer，
//! 组装成一个一致的 [`RelayContext`] 快照。快照保存在 `ArcSwapOption` 中，
//! 只有 manager 自己写入（`record_top_up` 通过 rcu 原子更新），读者无锁获取。

use arc_swap::ArcSwapOption;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;

use super::context::{RelayAccountStatus, RelayContext, UsageStatus};
use super::program::RelayProgram;
use crate::api::FeeRelayerApi;
use crate::common::{ChainStateLookup, RelayError, RelayResult};
use crate::constants::{RELAY_ACCOUNT_LEN, TOKEN_ACCOUNT_LEN};

pub struct RelayContextManager<C, A> {
    owner: Pubkey,
    program: RelayProgram,
    chain: C,
    api: A,
    free_transactions_enabled: bool,
    context: ArcSwapOption<RelayContext>,
}

impl<C: ChainStateLookup, A: FeeRelayerApi> RelayContextManager<C, A> {
    pub fn new(owner: Pubkey, program: RelayProgram, chain: C, api: A) -> Self {
        Self {
            owner,
            program,
            chain,
            api,
            free_transactions_enabled: true,
            context: ArcSwapOption::empty(),
        }
    }

    /// When disabled the usage endpoint is skipped and the quota is reported exhausted
    pub fn with_free_transactions(mut self, enabled: bool) -> Self {
        self.free_transactions_enabled = enabled;
        self
    }

    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }

    pub fn current_context(&self) -> Option<Arc<RelayContext>> {
        self.context.load_full()
    }

    pub fn replace_context(&self, context: RelayContext) {
        self.context.store(Some(Arc::new(context)));
    }

    /// Cached context, loading it first if nothing is cached yet
    pub async fn get_current_context_or_update(&self) -> RelayResult<Arc<RelayContext>> {
        match self.current_context() {
            Some(context) => Ok(context),
            None => self.update().await,
        }
    }

    async fn fetch_usage_status(&self) -> RelayResult<UsageStatus> {
        if !self.free_transactions_enabled {
            return Ok(UsageStatus::exhausted());
        }
        self.api.get_usage_status(&self.owner).await
    }

    /// Load a fresh snapshot without touching the cache
    pub async fn load(&self) -> RelayResult<RelayContext> {
        let relay_address = self.program.user_relay_address(&self.owner);

        let (
            minimum_token_account_balance,
            minimum_relay_account_balance,
            lamports_per_signature,
            relay_account,
            usage_status,
            fee_payer,
        ) = tokio::try_join!(
            self.chain.minimum_balance_for_rent_exemption(TOKEN_ACCOUNT_LEN),
            self.chain.minimum_balance_for_rent_exemption(RELAY_ACCOUNT_LEN),
            self.chain.lamports_per_signature(),
            self.chain.fetch_account(&relay_address),
            self.fetch_usage_status(),
            self.api.get_fee_payer_pubkey(),
        )?;

        let fee_payer_address =
            Pubkey::from_str(&fee_payer).map_err(|_| RelayError::InvalidFeePayer(fee_payer.clone()))?;

        let relay_account_status = match relay_account {
            Some(account) => RelayAccountStatus::Created { balance: account.lamports },
            None => RelayAccountStatus::NotYetCreated,
        };

        Ok(RelayContext {
            minimum_token_account_balance,
            minimum_relay_account_balance,
            fee_payer_address,
            lamports_per_signature,
            relay_account_status,
            usage_status,
        })
    }

    /// Load a fresh snapshot and cache it
    pub async fn update(&self) -> RelayResult<Arc<RelayContext>> {
        let context = Arc::new(self.load().await?);
        tracing::debug!("relay context updated: {}", context.relay_account_status);
        self.context.store(Some(context.clone()));
        Ok(context)
    }

    /// `true` when the cached snapshot still matches the chain and the server
    pub async fn validate(&self) -> RelayResult<bool> {
        let Some(cached) = self.current_context() else {
            return Ok(false);
        };
        let fresh = self.load().await?;
        Ok(*cached == fresh)
    }

    /// 充值成功后本地记录一次免费额度消耗
    pub fn record_top_up(&self) -> RelayResult<Arc<RelayContext>> {
        let mut recorded = None;
        // rcu 在快照被并发替换时重试，不会覆盖 update 写入的新快照
        self.context.rcu(|current| {
            recorded = current.as_ref().map(|context| {
                let mut next = (**context).clone();
                next.usage_status = next.usage_status.after_top_up(next.top_up_network_fee());
                Arc::new(next)
            });
            recorded.clone()
        });
        recorded.ok_or(RelayError::InvalidContext)
    }
}
