use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fmt;

/// On-chain state of the user's relay account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayAccountStatus {
    NotYetCreated,
    Created { balance: u64 },
}

impl RelayAccountStatus {
    pub fn balance(&self) -> Option<u64> {
        match self {
            RelayAccountStatus::NotYetCreated => None,
            RelayAccountStatus::Created { balance } => Some(*balance),
        }
    }
}

impl fmt::Display for RelayAccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayAccountStatus::NotYetCreated => write!(f, "Relay account is not yet created"),
            RelayAccountStatus::Created { balance } => {
                write!(f, "Relay account is created, balance: {balance}")
            }
        }
    }
}

/// Free-transaction quota snapshot for one authority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageStatus {
    pub max_usage: u32,
    pub current_usage: u32,
    pub max_amount: u64,
    pub amount_used: u64,
    /// Carried through untouched; fee math does not read it
    pub reached_limit_link_creation: bool,
}

impl UsageStatus {
    pub fn new(max_usage: u32, current_usage: u32, max_amount: u64, amount_used: u64) -> Self {
        Self { max_usage, current_usage, max_amount, amount_used, reached_limit_link_creation: false }
    }

    /// Quota used when free transactions are switched off
    pub fn exhausted() -> Self {
        Self::default()
    }

    pub fn with_reached_limit_link_creation(mut self, reached: bool) -> Self {
        self.reached_limit_link_creation = reached;
        self
    }

    #[inline]
    pub fn free_transaction_fee_available(&self) -> bool {
        self.current_usage < self.max_usage
    }

    #[inline]
    pub fn amount_left(&self) -> u64 {
        self.max_amount.saturating_sub(self.amount_used)
    }

    /// 免费次数未用完且剩余额度足以覆盖 `fee`
    #[inline]
    pub fn is_free_transaction_fee_available(&self, fee: u64) -> bool {
        self.free_transaction_fee_available() && self.amount_used.saturating_add(fee) <= self.max_amount
    }

    /// The quota as it looks after one more free top-up costing `fee`
    pub fn after_top_up(&self, fee: u64) -> Self {
        Self {
            current_usage: self.current_usage.saturating_add(1),
            amount_used: self.amount_used.saturating_add(fee),
            ..*self
        }
    }
}

/// Everything the fee calculator needs to know, captured once per calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayContext {
    /// Rent-exempt minimum of an SPL token account
    pub minimum_token_account_balance: u64,
    /// Rent-exempt minimum of the relay account
    pub minimum_relay_account_balance: u64,
    pub fee_payer_address: Pubkey,
    pub lamports_per_signature: u64,
    pub relay_account_status: RelayAccountStatus,
    pub usage_status: UsageStatus,
}

impl RelayContext {
    /// Network fee of a top-up transaction (user + fee payer signatures)
    #[inline]
    pub fn top_up_network_fee(&self) -> u64 {
        self.lamports_per_signature.saturating_mul(2)
    }
}
