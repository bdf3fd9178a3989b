//! Reimbursement payment follow-up.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{PaymentMessageView, PaymentService};
use crate::domain::service_support::{UNKNOWN_OBJECT_MESSAGE, map_payment_error};
use crate::domain::{Error, Payment, PaymentId, RepositoryPorts, TransactionStatus, UserId};

/// Payment service implementing [`PaymentService`].
#[derive(Clone)]
pub struct DomainPaymentService {
    ports: RepositoryPorts,
    clock: Arc<dyn Clock>,
}

impl DomainPaymentService {
    /// Create a new service over the given ports.
    pub fn new(ports: RepositoryPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    async fn ensure_admin(&self, requester: &UserId) -> Result<(), Error> {
        self.ports.requester(requester).await?.ensure_admin()
    }
}

#[async_trait]
impl PaymentService for DomainPaymentService {
    async fn list_by_last_status(
        &self,
        requester: &UserId,
        status: TransactionStatus,
    ) -> Result<Vec<Payment>, Error> {
        self.ensure_admin(requester).await?;
        self.ports
            .payments
            .find_with_last_status(status)
            .await
            .map_err(map_payment_error)
    }

    async fn message(&self, requester: &UserId, name: &str) -> Result<PaymentMessageView, Error> {
        self.ensure_admin(requester).await?;
        let checksum = self
            .ports
            .payments
            .find_message_checksum(name)
            .await
            .map_err(map_payment_error)?
            .ok_or_else(|| Error::not_found("name", UNKNOWN_OBJECT_MESSAGE))?;
        let payments = self
            .ports
            .payments
            .find_by_message(name)
            .await
            .map_err(map_payment_error)?;
        Ok(PaymentMessageView {
            name: name.to_owned(),
            checksum,
            payments,
        })
    }

    async fn append_status(
        &self,
        requester: &UserId,
        id: &PaymentId,
        status: TransactionStatus,
        detail: Option<String>,
    ) -> Result<Payment, Error> {
        self.ensure_admin(requester).await?;
        let mut payment = self
            .ports
            .payments
            .find_by_id(id)
            .await
            .map_err(map_payment_error)?
            .ok_or_else(|| Error::not_found("paymentId", UNKNOWN_OBJECT_MESSAGE))?;

        let now = self.clock.utc();
        match detail {
            Some(detail) => payment.set_status_with_detail(status, detail, now),
            None => payment.set_status(status, now),
        }
        let Some(entry) = payment.statuses.last() else {
            return Err(Error::internal("payment status was not recorded"));
        };
        self.ports
            .payments
            .append_status(&payment.id, entry)
            .await
            .map_err(map_payment_error)?;
        info!(payment_id = %payment.id, %status, "payment status appended");
        Ok(payment)
    }
}
