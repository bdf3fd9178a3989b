//! Reimbursement payment follow-up for global admins.
//!
//! ```text
//! GET /api/v1/payments?status=ERROR
//! GET /api/v1/payments/messages/{name}
//! POST /api/v1/payments/{id}/statuses {"status":"RETRY","detail":"..."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, PaymentId, TransactionStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{PaymentMessageResponse, PaymentResponse};
use crate::inbound::http::schemas::{ErrorSchema, TransactionStatusSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{REQUIRED_MESSAGE, parse_path_id};

/// Filter on the latest payment status.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentStatusQuery {
    #[param(value_type = Option<TransactionStatusSchema>)]
    pub status: Option<String>,
}

/// Request body appending a status to a payment.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PaymentStatusRequest {
    #[schema(value_type = Option<TransactionStatusSchema>)]
    pub status: Option<String>,
    pub detail: Option<String>,
}

fn parse_status(raw: Option<&str>) -> Result<TransactionStatus, Error> {
    raw.ok_or_else(|| Error::invalid_request("status", REQUIRED_MESSAGE))?
        .trim()
        .to_uppercase()
        .parse()
}

/// Payments whose latest status matches the filter.
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(PaymentStatusQuery),
    responses(
        (status = 200, description = "Payments", body = [PaymentResponse]),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "listPayments",
    security(("SessionCookie" = []))
)]
#[get("/payments")]
pub async fn list_payments(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PaymentStatusQuery>,
) -> ApiResult<web::Json<Vec<PaymentResponse>>> {
    let user_id = session.require_user_id()?;
    let status = parse_status(query.status.as_deref())?;
    let payments = state.payments.list_by_last_status(&user_id, status).await?;
    Ok(web::Json(payments.into_iter().map(Into::into).collect()))
}

/// Payments sent in one message, with the message checksum.
#[utoipa::path(
    get,
    path = "/api/v1/payments/messages/{name}",
    params(("name" = String, Path, description = "Payment message name")),
    responses(
        (status = 200, description = "Message", body = PaymentMessageResponse),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown message", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "getPaymentMessage",
    security(("SessionCookie" = []))
)]
#[get("/payments/messages/{name}")]
pub async fn get_payment_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    name: web::Path<String>,
) -> ApiResult<web::Json<PaymentMessageResponse>> {
    let user_id = session.require_user_id()?;
    let view = state.payments.message(&user_id, &name).await?;
    Ok(web::Json(view.into()))
}

/// Append a status to a payment's history.
#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/statuses",
    params(("id" = String, Path, description = "Payment identifier")),
    request_body = PaymentStatusRequest,
    responses(
        (status = 201, description = "Status appended", body = PaymentResponse),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown payment", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "appendPaymentStatus",
    security(("SessionCookie" = []))
)]
#[post("/payments/{id}/statuses")]
pub async fn append_payment_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PaymentStatusRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id: PaymentId = parse_path_id(&path)?;
    let PaymentStatusRequest { status, detail } = payload.into_inner();
    let status = parse_status(status.as_deref())?;
    let payment = state
        .payments
        .append_status(&user_id, &id, status, detail)
        .await?;
    Ok(HttpResponse::Created().json(PaymentResponse::from(payment)))
}
