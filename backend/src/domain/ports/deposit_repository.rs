//! Port for wallet deposits.
use async_trait::async_trait;

use crate::domain::{Deposit, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by deposit repository adapters.
    pub enum DepositRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "deposit repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "deposit repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepositRepository: Send + Sync {
    /// Deposits credited to a user.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Deposit>, DepositRepositoryError>;
}
