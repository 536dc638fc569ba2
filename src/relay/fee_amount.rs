use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Lamports needed for one relayed operation, split by purpose
///
/// All arithmetic saturates: subtracting a larger amount clamps at zero and adding
/// past `u64::MAX` clamps at the maximum. A fee split can never wrap around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeAmount {
    /// Signature and compute fees
    pub transaction: u64,
    /// Rent-exempt balances for accounts created by the operation
    pub account_balances: u64,
}

impl FeeAmount {
    pub const ZERO: FeeAmount = FeeAmount { transaction: 0, account_balances: 0 };

    pub const fn new(transaction: u64, account_balances: u64) -> Self {
        Self { transaction, account_balances }
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.transaction.saturating_add(self.account_balances)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

impl Add for FeeAmount {
    type Output = FeeAmount;

    fn add(self, rhs: Self) -> Self::Output {
        FeeAmount {
            transaction: self.transaction.saturating_add(rhs.transaction),
            account_balances: self.account_balances.saturating_add(rhs.account_balances),
        }
    }
}

impl Sub for FeeAmount {
    type Output = FeeAmount;

    fn sub(self, rhs: Self) -> Self::Output {
        FeeAmount {
            transaction: self.transaction.saturating_sub(rhs.transaction),
            account_balances: self.account_balances.saturating_sub(rhs.account_balances),
        }
    }
}

impl AddAssign for FeeAmount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for FeeAmount {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Sum for FeeAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(FeeAmount::ZERO, Add::add)
    }
}

impl fmt::Display for FeeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transaction: {}, account balances: {} (total {})",
            self.transaction,
            self.account_balances,
            self.total()
        )
    }
}
