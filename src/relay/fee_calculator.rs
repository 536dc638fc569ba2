//! 中继账户充值金额计算
//!
//! 纯同步计算，只读取 [`RelayContext`] 快照，可被任意并发调用。
//! 所有减法都是饱和减法，结果不会回绕。

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use super::context::{RelayAccountStatus, RelayContext};
use super::fee_amount::FeeAmount;
use crate::common::{RelayError, RelayResult};
use crate::constants::{MINIMUM_TOP_UP_AMOUNT, TOP_UP_SLIPPAGE_BPS, WRAPPED_SOL_MINT};
use crate::swap::{TradablePoolsProvider, find_best_pools_pair_for_estimated_amount};

#[async_trait]
pub trait RelayFeeCalculator: Send + Sync {
    /// Lamports that must be moved into the relay account before `expected_fee` can be
    /// paid through the relay.
    fn calculate_needed_top_up_amount(
        &self,
        context: &RelayContext,
        expected_fee: FeeAmount,
        paying_token_mint: &Pubkey,
    ) -> FeeAmount;

    /// Convert a SOL-denominated fee into the amount of `paying_token_mint` the top-up
    /// swap has to sell.
    async fn calculate_fee_in_paying_token(
        &self,
        pools: &dyn TradablePoolsProvider,
        fee_in_sol: FeeAmount,
        paying_token_mint: &Pubkey,
    ) -> RelayResult<FeeAmount>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRelayFeeCalculator;

impl DefaultRelayFeeCalculator {
    pub fn new() -> Self {
        Self
    }

    /// 不考虑最小充值额时需要的金额
    fn calculate_min_top_up_amount(
        context: &RelayContext,
        expected_fee: FeeAmount,
        paying_token_mint: &Pubkey,
    ) -> FeeAmount {
        let usage = &context.usage_status;
        let top_up_network_fee = context.top_up_network_fee();

        // 充值交易本身是否免费
        let needed_top_up_fee =
            if usage.is_free_transaction_fee_available(top_up_network_fee) { 0 } else { top_up_network_fee };

        // 充值之后，中继交易是否仍然免费
        let needed_transaction_fee = if usage
            .after_top_up(top_up_network_fee)
            .is_free_transaction_fee_available(expected_fee.transaction)
        {
            0
        } else {
            expected_fee.transaction
        };

        let mut needed = FeeAmount {
            transaction: needed_top_up_fee.saturating_add(needed_transaction_fee),
            account_balances: expected_fee.account_balances,
        };

        // totally free
        if needed.is_zero() {
            return needed;
        }

        let minimum_relay_balance = context.minimum_relay_account_balance;
        match context.relay_account_status {
            RelayAccountStatus::NotYetCreated => {
                needed.account_balances = needed.account_balances.saturating_add(minimum_relay_balance);
            }
            RelayAccountStatus::Created { balance } if balance < minimum_relay_balance => {
                needed.account_balances =
                    needed.account_balances.saturating_add(minimum_relay_balance - balance);
            }
            RelayAccountStatus::Created { balance } => {
                // surplus above the relay floor pays the transaction part first
                let mut surplus = balance - minimum_relay_balance;
                if surplus >= needed.transaction {
                    surplus -= needed.transaction;
                    needed.transaction = 0;
                    needed.account_balances = needed.account_balances.saturating_sub(surplus);
                } else {
                    needed.transaction -= surplus;
                }
            }
        }

        // 用 WSOL 支付时不经过中继账户，只需要账户创建费用
        if !needed.is_zero() && *paying_token_mint == WRAPPED_SOL_MINT {
            return FeeAmount::new(0, expected_fee.account_balances);
        }

        needed
    }
}

#[async_trait]
impl RelayFeeCalculator for DefaultRelayFeeCalculator {
    fn calculate_needed_top_up_amount(
        &self,
        context: &RelayContext,
        expected_fee: FeeAmount,
        paying_token_mint: &Pubkey,
    ) -> FeeAmount {
        let mut amount = Self::calculate_min_top_up_amount(context, expected_fee, paying_token_mint);

        let total = amount.total();
        if total > 0 && total < MINIMUM_TOP_UP_AMOUNT {
            let missing = MINIMUM_TOP_UP_AMOUNT - total;
            // the transaction part of a WSOL payment stays zero
            if *paying_token_mint == WRAPPED_SOL_MINT {
                amount.account_balances += missing;
            } else {
                amount.transaction += missing;
            }
        }

        tracing::debug!(
            "needed top up for {} with {}: {}",
            paying_token_mint,
            context.relay_account_status,
            amount
        );
        amount
    }

    async fn calculate_fee_in_paying_token(
        &self,
        pools: &dyn TradablePoolsProvider,
        fee_in_sol: FeeAmount,
        paying_token_mint: &Pubkey,
    ) -> RelayResult<FeeAmount> {
        if *paying_token_mint == WRAPPED_SOL_MINT {
            return Ok(fee_in_sol);
        }

        let pairs = pools.get_tradable_pools_pairs(paying_token_mint, &WRAPPED_SOL_MINT).await?;
        let best = find_best_pools_pair_for_estimated_amount(fee_in_sol.total(), &pairs)
            .ok_or(RelayError::SwapPoolsNotFound)?;

        let transaction = best.get_input_amount(fee_in_sol.transaction, TOP_UP_SLIPPAGE_BPS)?;
        let account_balances = best.get_input_amount(fee_in_sol.account_balances, TOP_UP_SLIPPAGE_BPS)?;

        Ok(FeeAmount { transaction, account_balances })
    }
}
