//! Driving port for reimbursement payment follow-up. Global admins only.

use async_trait::async_trait;

use crate::domain::{Error, Payment, PaymentId, TransactionStatus, UserId};

/// Payments sent in one message, with the message checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMessageView {
    pub name: String,
    pub checksum: String,
    pub payments: Vec<Payment>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Payments whose latest status is `status`.
    async fn list_by_last_status(
        &self,
        requester: &UserId,
        status: TransactionStatus,
    ) -> Result<Vec<Payment>, Error>;

    /// Payments of a message and its checksum.
    async fn message(&self, requester: &UserId, name: &str) -> Result<PaymentMessageView, Error>;

    /// Append a status to a payment's history.
    async fn append_status(
        &self,
        requester: &UserId,
        id: &PaymentId,
        status: TransactionStatus,
        detail: Option<String>,
    ) -> Result<Payment, Error>;
}
