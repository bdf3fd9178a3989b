//! Wallet credits granted to beneficiaries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{DepositId, UserId};

/// Amount granted when a pass is activated.
pub const ACTIVATION_DEPOSIT_AMOUNT: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Source recorded on activation deposits.
pub const ACTIVATION_SOURCE: &str = "activation";

/// Credit added to a user's wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    pub id: DepositId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub source: String,
    pub date_created: DateTime<Utc>,
}

impl Deposit {
    /// Activation grant for `user_id`.
    pub fn activation(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: DepositId::random(),
            user_id,
            amount: ACTIVATION_DEPOSIT_AMOUNT,
            source: ACTIVATION_SOURCE.to_owned(),
            date_created: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_grants_five_hundred() {
        let user_id = UserId::random();
        let deposit = Deposit::activation(user_id, Utc::now());
        assert_eq!(deposit.amount, Decimal::from(500));
        assert_eq!(deposit.source, "activation");
        assert_eq!(deposit.user_id, user_id);
    }
}
