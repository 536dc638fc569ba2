//! Orca 风格的兑换池描述与恒定乘积计算
//!
//! 只实现中继充值需要的部分：根据期望输出反推输入，以及正向的输出估算。
//! 计算使用 u128 中间值，反推输入时的乘法做溢出检查。

use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::constants::BPS_DENOMINATOR;

const CONSTANT_PRODUCT: &str = "ConstantProduct";

/// 兑换池计算错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("池子余额未加载")]
    AccountBalanceNotFound,
    #[error("期望输出超过池子余额")]
    EstimatedAmountTooHigh,
    #[error("不支持的曲线类型: {0}")]
    UnsupportedCurve(String),
    #[error("手续费配置无效")]
    InvalidFeeConfig,
    #[error("无效的池子路径: {0} 个池子")]
    InvalidPoolsPair(usize),
    #[error("滑点无效: {0} bps")]
    InvalidSlippage(u64),
    #[error("计算溢出")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub account: String,
    pub authority: String,
    #[serde(default)]
    pub nonce: u64,
    pub pool_token_mint: String,
    pub token_account_a: String,
    pub token_account_b: String,
    pub fee_account: String,
    #[serde(default)]
    pub host_fee_account: Option<String>,
    pub fee_numerator: u64,
    pub fee_denominator: u64,
    pub owner_trade_fee_numerator: u64,
    pub owner_trade_fee_denominator: u64,
    #[serde(default)]
    pub owner_withdraw_fee_numerator: u64,
    #[serde(default)]
    pub owner_withdraw_fee_denominator: u64,
    #[serde(default)]
    pub host_fee_numerator: u64,
    #[serde(default)]
    pub host_fee_denominator: u64,
    /// Symbol of token A, e.g. `SOL`
    pub token_a_name: String,
    /// Symbol of token B, e.g. `USDC`
    pub token_b_name: String,
    pub curve_type: String,
    #[serde(default)]
    pub amp: Option<u64>,
    #[serde(default)]
    pub program_version: Option<u64>,
    #[serde(default)]
    pub deprecated: Option<bool>,

    /// Vault balances, loaded separately from the pool config
    #[serde(skip)]
    pub token_a_balance: Option<u64>,
    #[serde(skip)]
    pub token_b_balance: Option<u64>,
}

impl Pool {
    pub fn with_balances(mut self, token_a_balance: u64, token_b_balance: u64) -> Self {
        self.token_a_balance = Some(token_a_balance);
        self.token_b_balance = Some(token_b_balance);
        self
    }

    /// Same pool seen from the other side: A and B swapped
    pub fn reversed(&self) -> Self {
        let mut pool = self.clone();
        std::mem::swap(&mut pool.token_account_a, &mut pool.token_account_b);
        std::mem::swap(&mut pool.token_a_name, &mut pool.token_b_name);
        std::mem::swap(&mut pool.token_a_balance, &mut pool.token_b_balance);
        pool
    }

    fn balances(&self) -> Result<(u64, u64), PoolError> {
        match (self.token_a_balance, self.token_b_balance) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(PoolError::AccountBalanceNotFound),
        }
    }

    fn ensure_constant_product(&self) -> Result<(), PoolError> {
        if self.curve_type == CONSTANT_PRODUCT {
            Ok(())
        } else {
            Err(PoolError::UnsupportedCurve(self.curve_type.clone()))
        }
    }

    /// Trading fee plus owner fee charged on `input_amount`
    pub fn get_fee(&self, input_amount: u64) -> Result<u64, PoolError> {
        self.ensure_constant_product()?;
        let trading = compute_fee(input_amount, self.fee_numerator, self.fee_denominator);
        let owner = compute_fee(input_amount, self.owner_trade_fee_numerator, self.owner_trade_fee_denominator);
        Ok(trading.saturating_add(owner))
    }

    /// Token B received for `input_amount` of token A, fees included
    pub fn get_output_amount(&self, input_amount: u64) -> Result<u64, PoolError> {
        let fees = self.get_fee(input_amount)?;
        let input_less_fee = input_amount.saturating_sub(fees);
        let (pool_input, pool_output) = self.balances()?;

        let invariant = pool_input as u128 * pool_output as u128;
        let new_pool_output = ceiling_division(invariant, pool_input as u128 + input_less_fee as u128);
        Ok(pool_output.saturating_sub(new_pool_output as u64))
    }

    /// Token A needed to receive exactly `estimated_amount` of token B
    pub fn get_input_amount_from_estimated(&self, estimated_amount: u64) -> Result<u64, PoolError> {
        self.ensure_constant_product()?;
        let (pool_input, pool_output) = self.balances()?;
        if estimated_amount >= pool_output {
            return Err(PoolError::EstimatedAmountTooHigh);
        }

        let invariant = pool_input as u128 * pool_output as u128;
        let new_pool_input = ceiling_division(invariant, (pool_output - estimated_amount) as u128);
        let input_less_fee = new_pool_input.saturating_sub(pool_input as u128);

        let fee_denominator = self.fee_denominator as u128;
        let fee_numerator = self.fee_numerator as u128;
        let (ratio_numerator, ratio_denominator) = if self.owner_trade_fee_denominator == 0 {
            (fee_denominator, fee_denominator.saturating_sub(fee_numerator))
        } else {
            let owner_denominator = self.owner_trade_fee_denominator as u128;
            let owner_numerator = self.owner_trade_fee_numerator as u128;
            let numerator = fee_denominator.checked_mul(owner_denominator).ok_or(PoolError::Overflow)?;
            let trading = fee_numerator.checked_mul(owner_denominator).ok_or(PoolError::Overflow)?;
            let owner = owner_numerator.checked_mul(fee_denominator).ok_or(PoolError::Overflow)?;
            (numerator, numerator.saturating_sub(trading).saturating_sub(owner))
        };
        if ratio_denominator == 0 {
            return Err(PoolError::InvalidFeeConfig);
        }

        let input = input_less_fee
            .checked_mul(ratio_numerator)
            .ok_or(PoolError::Overflow)?
            / ratio_denominator;
        u64::try_from(input).map_err(|_| PoolError::Overflow)
    }

    /// Input needed so that `minimum_receive_amount` is still met after `slippage_bps`
    pub fn get_input_amount(&self, minimum_receive_amount: u64, slippage_bps: u64) -> Result<Option<u64>, PoolError> {
        if slippage_bps >= BPS_DENOMINATOR {
            return Ok(None);
        }
        let estimated = minimum_receive_amount as u128 * BPS_DENOMINATOR as u128
            / (BPS_DENOMINATOR - slippage_bps) as u128;
        let estimated = u64::try_from(estimated).unwrap_or(u64::MAX);
        self.get_input_amount_from_estimated(estimated).map(Some)
    }

    pub fn get_minimum_amount_out(&self, input_amount: u64, slippage_bps: u64) -> Result<u64, PoolError> {
        let estimated = self.get_output_amount(input_amount)? as u128;
        let bps = BPS_DENOMINATOR.saturating_sub(slippage_bps) as u128;
        Ok((estimated * bps / BPS_DENOMINATOR as u128) as u64)
    }
}

fn compute_fee(base_amount: u64, fee_numerator: u64, fee_denominator: u64) -> u64 {
    if fee_numerator == 0 || fee_denominator == 0 {
        return 0;
    }
    (base_amount as u128 * fee_numerator as u128 / fee_denominator as u128) as u64
}

/// 向上取整除法；商为 0 时不进位
fn ceiling_division(dividend: u128, divisor: u128) -> u128 {
    if divisor == 0 {
        return 0;
    }
    let quotient = dividend / divisor;
    if quotient == 0 {
        return 0;
    }
    if dividend % divisor > 0 { quotient + 1 } else { quotient }
}

/// A route of one (direct) or two (transitive) pools
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolsPair(pub Vec<Pool>);

impl PoolsPair {
    pub fn new(pools: Vec<Pool>) -> Self {
        Self(pools)
    }

    fn check_len(&self) -> Result<(), PoolError> {
        match self.0.len() {
            1 | 2 => Ok(()),
            n => Err(PoolError::InvalidPoolsPair(n)),
        }
    }

    /// Symbol of the intermediate token of a transitive route
    pub fn intermediary_token_name(&self) -> Option<&str> {
        match self.0.as_slice() {
            [first, _] => Some(first.token_b_name.as_str()),
            _ => None,
        }
    }

    pub fn get_output_amount(&self, input_amount: u64) -> Option<u64> {
        self.check_len().ok()?;
        self.0.iter().try_fold(input_amount, |amount, pool| pool.get_output_amount(amount).ok())
    }

    /// 反推：先计算最后一个池子的输入，再作为前一个池子的期望输出
    pub fn get_input_amount_from_estimated(&self, estimated_amount: u64) -> Option<u64> {
        self.check_len().ok()?;
        self.0
            .iter()
            .rev()
            .try_fold(estimated_amount, |amount, pool| pool.get_input_amount_from_estimated(amount).ok())
    }

    pub fn get_input_amount(&self, minimum_amount_out: u64, slippage_bps: u64) -> Result<u64, PoolError> {
        self.check_len()?;
        self.0.iter().rev().try_fold(minimum_amount_out, |amount, pool| {
            pool.get_input_amount(amount, slippage_bps)?
                .ok_or(PoolError::InvalidSlippage(slippage_bps))
        })
    }
}

impl Deref for PoolsPair {
    type Target = [Pool];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Pair needing the least input to produce `estimated_amount`
pub fn find_best_pools_pair_for_estimated_amount(
    estimated_amount: u64,
    pairs: &[PoolsPair],
) -> Option<&PoolsPair> {
    pairs
        .iter()
        .filter_map(|pair| pair.get_input_amount_from_estimated(estimated_amount).map(|input| (input, pair)))
        .min_by_key(|(input, _)| *input)
        .map(|(_, pair)| pair)
}
