//! 中继充值金额计算测试
//!
//! 覆盖免费额度、中继账户最低余额、WSOL 支付以及最小充值额等场景


use sol_fee_relayer::common::RelayError;
use sol_fee_relayer::constants::{MINIMUM_TOP_UP_AMOUNT, USDC_MINT, WRAPPED_SOL_MINT};
use sol_fee_relayer::relay::{DefaultRelayFeeCalculator, FeeAmount, RelayAccountStatus, RelayFeeCalculator, UsageStatus};
use sol_fee_relayer::swap::{PoolError, StaticPoolsProvider};
use sol_fee_relayer::utils::StaticTokenRegistry;
use test_helpers::*;

const TOP_UP_FEE: u64 = 2 * LAMPORTS_PER_SIGNATURE;

fn calculate(status: RelayAccountStatus, usage: UsageStatus, expected: FeeAmount, mint: &solana_sdk::pubkey::Pubkey) -> FeeAmount {
    let ctx = context(status, usage);
    DefaultRelayFeeCalculator::new().calculate_needed_top_up_amount(&ctx, expected, mint)
}

#[test]
fn test_zero_fee_with_funded_relay_account_is_free() {
    let result = calculate(
        RelayAccountStatus::Created { balance: MIN_RELAY_ACCOUNT_BALANCE },
        free_usage(),
        FeeAmount::ZERO,
        &USDC_MINT,
    );
    assert_eq!(result, FeeAmount::ZERO);
}

#[test]
fn test_free_transaction_without_relay_account() {
    // relay 账户未创建，但交易费完全免费
    let result = calculate(
        RelayAccountStatus::NotYetCreated,
        free_usage(),
        FeeAmount::new(5_000, 0),
        &USDC_MINT,
    );
    assert_eq!(result, FeeAmount::ZERO);
}

#[test]
fn test_wsol_only_pays_account_creation() {
    let expected = FeeAmount::new(5_000, MIN_TOKEN_ACCOUNT_BALANCE);
    for usage in [free_usage(), UsageStatus::exhausted()] {
        let result = calculate(RelayAccountStatus::NotYetCreated, usage, expected, &WRAPPED_SOL_MINT);
        assert_eq!(result, FeeAmount::new(0, MIN_TOKEN_ACCOUNT_BALANCE));
    }

    let result = calculate(
        RelayAccountStatus::Created { balance: 100 },
        UsageStatus::exhausted(),
        expected,
        &WRAPPED_SOL_MINT,
    );
    assert_eq!(result.transaction, 0);
}

#[test]
fn test_wsol_small_amount_is_raised_on_account_balances() {
    let result = calculate(
        RelayAccountStatus::NotYetCreated,
        UsageStatus::exhausted(),
        FeeAmount::new(5_000, 1_000),
        &WRAPPED_SOL_MINT,
    );
    assert_eq!(result, FeeAmount::new(0, MINIMUM_TOP_UP_AMOUNT));
}

#[test]
fn test_quota_exhausted_without_relay_account() {
    let expected = FeeAmount::new(5_000, MIN_TOKEN_ACCOUNT_BALANCE);
    let result = calculate(RelayAccountStatus::NotYetCreated, UsageStatus::exhausted(), expected, &USDC_MINT);

    assert_eq!(result.transaction, expected.transaction + TOP_UP_FEE);
    assert_eq!(result.account_balances, MIN_RELAY_ACCOUNT_BALANCE + MIN_TOKEN_ACCOUNT_BALANCE);
}

#[test]
fn test_underfunded_relay_account_with_quota_exhausted() {
    let balance = 500_000;
    let expected = FeeAmount::new(10_000, MIN_TOKEN_ACCOUNT_BALANCE);
    let result = calculate(
        RelayAccountStatus::Created { balance },
        UsageStatus::exhausted(),
        expected,
        &USDC_MINT,
    );

    assert_eq!(
        result,
        FeeAmount::new(
            expected.transaction + TOP_UP_FEE,
            (MIN_RELAY_ACCOUNT_BALANCE - balance) + expected.account_balances
        )
    );
}

#[test]
fn test_relay_surplus_covers_transaction_first() {
    let surplus = 1_000_000;
    let expected = FeeAmount::new(5_000, MIN_TOKEN_ACCOUNT_BALANCE);
    let result = calculate(
        RelayAccountStatus::Created { balance: MIN_RELAY_ACCOUNT_BALANCE + surplus },
        UsageStatus::exhausted(),
        expected,
        &USDC_MINT,
    );

    let left = surplus - (expected.transaction + TOP_UP_FEE);
    assert_eq!(result, FeeAmount::new(0, MIN_TOKEN_ACCOUNT_BALANCE - left));
}

#[test]
fn test_small_surplus_reduces_transaction_only() {
    let expected = FeeAmount::new(5_000, MIN_TOKEN_ACCOUNT_BALANCE);
    let result = calculate(
        RelayAccountStatus::Created { balance: MIN_RELAY_ACCOUNT_BALANCE + 3_000 },
        UsageStatus::exhausted(),
        expected,
        &USDC_MINT,
    );

    assert_eq!(result, FeeAmount::new(expected.transaction + TOP_UP_FEE - 3_000, MIN_TOKEN_ACCOUNT_BALANCE));
}

#[test]
fn test_minimum_top_up_floor() {
    // 余额刚好差一点：原始结果 5_000，提升到最小充值额
    let expected = FeeAmount::new(5_000, 0);
    let result = calculate(
        RelayAccountStatus::Created { balance: MIN_RELAY_ACCOUNT_BALANCE + TOP_UP_FEE },
        UsageStatus::exhausted(),
        expected,
        &USDC_MINT,
    );
    assert_eq!(result.total(), MINIMUM_TOP_UP_AMOUNT);
    assert_eq!(result.account_balances, 0);
}

#[test]
fn test_fully_covered_by_surplus_stays_zero() {
    let result = calculate(
        RelayAccountStatus::Created { balance: MIN_RELAY_ACCOUNT_BALANCE * 10 },
        UsageStatus::exhausted(),
        FeeAmount::new(5_000, MIN_TOKEN_ACCOUNT_BALANCE),
        &USDC_MINT,
    );
    assert_eq!(result, FeeAmount::ZERO);
}

#[test]
fn test_account_balances_monotonic_in_relay_balance() {
    let expected = FeeAmount::new(5_000, MIN_TOKEN_ACCOUNT_BALANCE);
    for usage in [free_usage(), UsageStatus::exhausted(), UsageStatus::new(1, 0, 7_000, 0)] {
        let mut previous = u64::MAX;
        for balance in (0..=4_000_000u64).step_by(37_000) {
            let result = calculate(RelayAccountStatus::Created { balance }, usage, expected, &USDC_MINT);
            assert!(
                result.account_balances <= previous,
                "balance {} produced {} after {}",
                balance,
                result.account_balances,
                previous
            );
            previous = result.account_balances;
        }
    }
}

#[test]
fn test_top_up_consumes_the_last_free_slot() {
    // 只剩一次免费：充值本身免费，之后的中继交易需要付费
    let usage = UsageStatus::new(1, 0, 10_000_000, 0);
    let result = calculate(RelayAccountStatus::NotYetCreated, usage, FeeAmount::new(5_000, 0), &USDC_MINT);
    assert_eq!(result, FeeAmount::new(5_000, MIN_RELAY_ACCOUNT_BALANCE));

    // 剩余金额不足以覆盖充值费用
    let usage = UsageStatus::new(100, 0, 12_000, 5_000);
    let result = calculate(RelayAccountStatus::NotYetCreated, usage, FeeAmount::new(5_000, 0), &USDC_MINT);
    assert_eq!(result, FeeAmount::new(TOP_UP_FEE + 5_000, MIN_RELAY_ACCOUNT_BALANCE));
}

#[test]
fn test_calculation_is_deterministic() {
    let ctx = context(RelayAccountStatus::Created { balance: 123_456 }, free_usage());
    let calculator = DefaultRelayFeeCalculator::new();
    let expected = FeeAmount::new(5_000, MIN_TOKEN_ACCOUNT_BALANCE);

    let first = calculator.calculate_needed_top_up_amount(&ctx, expected, &USDC_MINT);
    for _ in 0..10 {
        assert_eq!(calculator.calculate_needed_top_up_amount(&ctx, expected, &USDC_MINT), first);
    }
}

// ===== 换算成支付代币 =====

fn usdc_sol_provider() -> StaticPoolsProvider<StaticTokenRegistry> {
    // 1 SOL = 20 USDC
    StaticPoolsProvider::new(
        vec![pool("SOL", "USDC", 1_000_000_000_000, 20_000_000_000)],
        StaticTokenRegistry::default(),
    )
}

#[tokio::test]
async fn test_fee_in_paying_token_converts_each_component() {
    let provider = usdc_sol_provider();
    let fee = FeeAmount::new(10_000, MIN_TOKEN_ACCOUNT_BALANCE);

    let result = DefaultRelayFeeCalculator::new()
        .calculate_fee_in_paying_token(&provider, fee, &USDC_MINT)
        .await
        .unwrap();

    // 价格 + 手续费 + 滑点，结果应高于按价格直接换算的数量
    assert!(result.transaction > 10_000 / 50);
    assert!(result.account_balances > MIN_TOKEN_ACCOUNT_BALANCE / 50);
    assert!(result.account_balances < MIN_TOKEN_ACCOUNT_BALANCE / 50 * 11 / 10);
}

#[tokio::test]
async fn test_fee_in_paying_token_for_wsol_is_unchanged() {
    let provider = usdc_sol_provider();
    let fee = FeeAmount::new(10_000, MIN_TOKEN_ACCOUNT_BALANCE);

    let result = DefaultRelayFeeCalculator::new()
        .calculate_fee_in_paying_token(&provider, fee, &WRAPPED_SOL_MINT)
        .await
        .unwrap();
    assert_eq!(result, fee);
}

#[tokio::test]
async fn test_fee_in_paying_token_without_route() {
    let provider = StaticPoolsProvider::new(vec![], StaticTokenRegistry::default());
    let err = DefaultRelayFeeCalculator::new()
        .calculate_fee_in_paying_token(&provider, FeeAmount::new(10_000, 0), &USDC_MINT)
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::SwapPoolsNotFound));
}

#[tokio::test]
async fn test_fee_in_paying_token_beyond_reserve_after_slippage() {
    // 1 SOL = 0.001 USDC，SOL 储备 1e18
    let provider = StaticPoolsProvider::new(
        vec![pool("SOL", "USDC", 1_000_000_000_000_000_000, 1_000_000_000_000)],
        StaticTokenRegistry::default(),
    );
    let calculator = DefaultRelayFeeCalculator::new();

    let small = calculator
        .calculate_fee_in_paying_token(&provider, FeeAmount::new(10_000, 0), &USDC_MINT)
        .await
        .unwrap();
    assert!(small.transaction > 0);

    // 不含滑点时池子可以报价，加上 3% 滑点后超过 SOL 储备
    let err = calculator
        .calculate_fee_in_paying_token(&provider, FeeAmount::new(975_000_000_000_000_000, 0), &USDC_MINT)
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Pool(PoolError::EstimatedAmountTooHigh)));
}
