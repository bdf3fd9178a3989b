//! Wallet balances derived from deposits and bookings.
//!
//! `wallet_balance` subtracts every non-cancelled booking, `real_wallet_balance`
//! only the bookings already used. Since used bookings are a subset of
//! non-cancelled ones, `wallet_balance <= real_wallet_balance` always holds.

use rust_decimal::Decimal;

use crate::domain::{Booking, Deposit};

fn deposited(deposits: &[Deposit]) -> Decimal {
    deposits.iter().map(|deposit| deposit.amount).sum()
}

/// Deposits minus the value of every non-cancelled booking.
///
/// # Examples
/// ```
/// use backend::domain::wallet_balance;
/// use rust_decimal::Decimal;
///
/// assert_eq!(wallet_balance(&[], &[]), Decimal::ZERO);
/// ```
pub fn wallet_balance(deposits: &[Deposit], bookings: &[Booking]) -> Decimal {
    let spent: Decimal = bookings
        .iter()
        .filter(|booking| !booking.is_cancelled)
        .map(Booking::value)
        .sum();
    deposited(deposits) - spent
}

/// Deposits minus the value of non-cancelled used bookings.
pub fn real_wallet_balance(deposits: &[Deposit], bookings: &[Booking]) -> Decimal {
    let spent: Decimal = bookings
        .iter()
        .filter(|booking| !booking.is_cancelled && booking.is_used)
        .map(Booking::value)
        .sum();
    deposited(deposits) - spent
}

/// Balances reported on a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletSummary {
    pub is_activated: bool,
    pub balance: Decimal,
    pub real_balance: Decimal,
}

impl WalletSummary {
    /// Summarise a user's wallet.
    pub fn compute(deposits: &[Deposit], bookings: &[Booking]) -> Self {
        Self {
            is_activated: !deposits.is_empty(),
            balance: wallet_balance(deposits, bookings),
            real_balance: real_wallet_balance(deposits, bookings),
        }
    }
}
