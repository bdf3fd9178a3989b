//! Port for reimbursement payments.
use async_trait::async_trait;

use crate::domain::{Payment, PaymentId, PaymentStatus, TransactionStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by payment repository adapters.
    pub enum PaymentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "payment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "payment repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Fetch a payment with its status history.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, PaymentRepositoryError>;

    /// Payments whose latest status is `status`.
    async fn find_with_last_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<Payment>, PaymentRepositoryError>;

    /// Payments sent in the message called `name`.
    async fn find_by_message(&self, name: &str) -> Result<Vec<Payment>, PaymentRepositoryError>;

    /// Checksum of the message called `name`, if it exists.
    async fn find_message_checksum(
        &self,
        name: &str,
    ) -> Result<Option<String>, PaymentRepositoryError>;

    /// Append a status entry to a payment's history.
    async fn append_status(
        &self,
        id: &PaymentId,
        status: &PaymentStatus,
    ) -> Result<(), PaymentRepositoryError>;
}
