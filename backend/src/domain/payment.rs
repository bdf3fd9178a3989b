//! Reimbursement payments owed to offerers.
//!
//! A payment keeps an append-only history of transaction statuses; its
//! current status is the last entry.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{BookingId, Error, PaymentId};

/// Transaction state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    NotProcessable,
    Sent,
    Error,
    Retry,
    Banned,
}

impl TransactionStatus {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::NotProcessable => "NOT_PROCESSABLE",
            Self::Sent => "SENT",
            Self::Error => "ERROR",
            Self::Retry => "RETRY",
            Self::Banned => "BANNED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "NOT_PROCESSABLE" => Ok(Self::NotProcessable),
            "SENT" => Ok(Self::Sent),
            "ERROR" => Ok(Self::Error),
            "RETRY" => Ok(Self::Retry),
            "BANNED" => Ok(Self::Banned),
            other => Err(Error::invalid_request(
                "status",
                format!("Statut de paiement inconnu : {other}"),
            )),
        }
    }
}

/// One entry of a payment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentStatus {
    pub status: TransactionStatus,
    pub detail: Option<String>,
    pub date: DateTime<Utc>,
}

/// Batch of payments transmitted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMessage {
    pub name: String,
    /// Hex-encoded SHA-256 of the transmitted document.
    pub checksum: String,
}

/// Reimbursement of one booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: PaymentId,
    pub booking_id: BookingId,
    pub amount: Decimal,
    pub reimbursement_rule: String,
    pub reimbursement_rate: Decimal,
    pub recipient_name: String,
    pub recipient_siren: String,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub author: String,
    pub transaction_label: Option<String>,
    pub payment_message_name: Option<String>,
    pub statuses: Vec<PaymentStatus>,
}

impl Payment {
    /// Append `status` with no detail.
    pub fn set_status(&mut self, status: TransactionStatus, now: DateTime<Utc>) {
        self.push_status(status, None, now);
    }

    /// Append `status` with an explanatory detail.
    pub fn set_status_with_detail(
        &mut self,
        status: TransactionStatus,
        detail: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.push_status(status, Some(detail.into()), now);
    }

    fn push_status(&mut self, status: TransactionStatus, detail: Option<String>, now: DateTime<Utc>) {
        self.statuses.push(PaymentStatus {
            status,
            detail,
            date: now,
        });
    }

    /// Latest status entry.
    pub fn current_status(&self) -> Option<&PaymentStatus> {
        self.statuses.iter().max_by_key(|status| status.date)
    }

    /// Whether the latest status equals `status`.
    pub fn has_last_status(&self, status: TransactionStatus) -> bool {
        self.current_status()
            .is_some_and(|current| current.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::{fixture, rstest};

    #[fixture]
    fn payment() -> Payment {
        Payment {
            id: PaymentId::random(),
            booking_id: BookingId::random(),
            amount: Decimal::from(10),
            reimbursement_rule: "Remboursement total pour les offres physiques".into(),
            reimbursement_rate: Decimal::ONE,
            recipient_name: "Test Offerer".into(),
            recipient_siren: "123456789".into(),
            iban: Some("FR7630001007941234567890185".into()),
            bic: Some("BDFEFR2L".into()),
            author: "batch".into(),
            transaction_label: None,
            payment_message_name: None,
            statuses: Vec::new(),
        }
    }

    #[rstest]
    fn appends_a_status_to_a_new_payment(mut payment: Payment) {
        let now = Utc::now();
        payment.set_status(TransactionStatus::Pending, now);

        assert_eq!(payment.statuses.len(), 1);
        assert_eq!(payment.statuses[0].status, TransactionStatus::Pending);
        assert!(payment.statuses[0].detail.is_none());
        assert_eq!(payment.statuses[0].date, now);
    }

    #[rstest]
    fn appends_after_existing_statuses(mut payment: Payment) {
        let now = Utc::now();
        payment.set_status(TransactionStatus::Pending, now - Duration::seconds(5));
        payment.set_status_with_detail(TransactionStatus::Error, "IBAN invalide", now);

        assert_eq!(payment.statuses.len(), 2);
        assert_eq!(payment.statuses[0].status, TransactionStatus::Pending);
        assert_eq!(payment.statuses[1].detail.as_deref(), Some("IBAN invalide"));
        assert!(payment.has_last_status(TransactionStatus::Error));
        assert!(!payment.has_last_status(TransactionStatus::Pending));
    }

    #[rstest]
    fn empty_history_has_no_status(payment: Payment) {
        assert!(payment.current_status().is_none());
        assert!(!payment.has_last_status(TransactionStatus::Pending));
    }

    #[rstest]
    #[case("PENDING", TransactionStatus::Pending)]
    #[case("NOT_PROCESSABLE", TransactionStatus::NotProcessable)]
    #[case("RETRY", TransactionStatus::Retry)]
    fn statuses_parse_their_stored_form(#[case] raw: &str, #[case] expected: TransactionStatus) {
        assert_eq!(raw.parse::<TransactionStatus>().expect("known"), expected);
        assert_eq!(expected.as_str(), raw);
    }
}
