//! PostgreSQL-backed `PaymentRepository` implementation using Diesel ORM.
//!
//! Payments are read together with their full status history; the latest
//! status is decided on the domain side.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PaymentRepository, PaymentRepositoryError};
use crate::domain::{Payment, PaymentId, PaymentStatus, TransactionStatus};

use super::error_mapping::{StoreFailure, map_basic_failure};
use super::models::{NewPaymentStatusRow, PaymentRow, PaymentStatusRow};
use super::pool::DbPool;
use super::schema::{payment_messages, payment_statuses, payments};

/// Diesel-backed implementation of the `PaymentRepository` port.
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(failure: StoreFailure) -> PaymentRepositoryError {
    map_basic_failure(
        failure,
        PaymentRepositoryError::connection,
        PaymentRepositoryError::query,
    )
}

/// Attach each payment's status history, oldest entry first.
async fn with_statuses(
    conn: &mut AsyncPgConnection,
    rows: Vec<PaymentRow>,
) -> Result<Vec<Payment>, PaymentRepositoryError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let status_rows: Vec<PaymentStatusRow> = payment_statuses::table
        .filter(payment_statuses::payment_id.eq_any(&ids))
        .select(PaymentStatusRow::as_select())
        .order_by((payment_statuses::date.asc(), payment_statuses::id.asc()))
        .load(conn)
        .await
        .map_err(|err| map_error(err.into()))?;

    let mut history: HashMap<Uuid, Vec<PaymentStatus>> = HashMap::new();
    for row in status_rows {
        let payment_id = row.payment_id;
        let status = PaymentStatus::try_from(row).map_err(PaymentRepositoryError::query)?;
        history.entry(payment_id).or_default().push(status);
    }
    Ok(rows
        .into_iter()
        .map(|row| {
            let statuses = history.remove(&row.id).unwrap_or_default();
            row.into_payment(statuses)
        })
        .collect())
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<PaymentRow> = payments::table
            .filter(payments::id.eq(*id.as_uuid()))
            .select(PaymentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(with_statuses(&mut conn, rows).await?.into_iter().next())
    }

    async fn find_with_last_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<Payment>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let candidates = payment_statuses::table
            .filter(payment_statuses::status.eq(status.as_str()))
            .select(payment_statuses::payment_id);
        let rows: Vec<PaymentRow> = payments::table
            .filter(payments::id.eq_any(candidates))
            .select(PaymentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        let mut found = with_statuses(&mut conn, rows).await?;
        found.retain(|payment| payment.has_last_status(status));
        Ok(found)
    }

    async fn find_by_message(&self, name: &str) -> Result<Vec<Payment>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<PaymentRow> = payments::table
            .filter(payments::payment_message_name.eq(name))
            .select(PaymentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        with_statuses(&mut conn, rows).await
    }

    async fn find_message_checksum(
        &self,
        name: &str,
    ) -> Result<Option<String>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        payment_messages::table
            .find(name)
            .select(payment_messages::checksum)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(err.into()))
    }

    async fn append_status(
        &self,
        id: &PaymentId,
        status: &PaymentStatus,
    ) -> Result<(), PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::insert_into(payment_statuses::table)
            .values(NewPaymentStatusRow {
                payment_id: *id.as_uuid(),
                status: status.status.as_str(),
                detail: status.detail.as_deref(),
                date: status.date,
            })
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(())
    }
}
