//! Booking HTTP handlers: reservation, cancellation, counter-mark checks and
//! the CSV export.
//!
//! ```text
//! POST /api/v1/bookings {"stockId":"...","quantity":1}
//! PATCH /api/v1/bookings/{id} {"isCancelled":true}
//! PATCH /api/v1/bookings/token/{token}?email=...&offer_id=...
//! GET /api/v1/bookings/csv?venueId=...&dateFrom=...
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::BookingExportFilter;
use crate::domain::{BookingId, Error, OfferId, StockId, TokenCheck, VenueId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bookings_csv::{
    CSV_CONTENT_DISPOSITION, CSV_CONTENT_TYPE, render_bookings_csv,
};
use crate::inbound::http::dto::{BookingResponse, TokenBookingResponse, UserBookingResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    REQUIRED_MESSAGE, parse_optional_datetime, parse_optional_id, parse_path_id,
    reject_unknown_keys,
};

const UNKNOWN_STOCK_MESSAGE: &str = "stockId ne correspond à aucun stock";
const CANCEL_ONLY_MESSAGE: &str = "Seule l'annulation d'une réservation est possible";

/// Request body for a new booking.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestBody {
    pub stock_id: Option<String>,
    /// Defaults to one place.
    pub quantity: Option<i32>,
}

fn parse_stock_id(raw: Option<&str>) -> Result<StockId, Error> {
    let raw = raw
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::invalid_request("stockId", REQUIRED_MESSAGE))?;
    raw.parse()
        .map_err(|_| Error::invalid_request("stockId", UNKNOWN_STOCK_MESSAGE))
}

/// Optional filters on a counter-mark lookup.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TokenQuery {
    /// E-mail the booking owner must have.
    pub email: Option<String>,
    /// Offer the booking must belong to.
    pub offer_id: Option<String>,
}

impl TryFrom<TokenQuery> for TokenCheck {
    type Error = Error;

    fn try_from(value: TokenQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            offer_id: parse_optional_id::<OfferId>("offer_id", value.offer_id.as_deref())?,
            email: value.email.filter(|email| !email.trim().is_empty()),
        })
    }
}

/// Filters of the CSV export.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ExportQuery {
    pub venue_id: Option<String>,
    #[serde(default)]
    pub only_digital_venues: bool,
    pub offer_id: Option<String>,
    /// Inclusive lower bound on the booking date (RFC 3339).
    pub date_from: Option<String>,
    /// Inclusive upper bound on the booking date (RFC 3339).
    pub date_to: Option<String>,
}

impl TryFrom<ExportQuery> for BookingExportFilter {
    type Error = Error;

    fn try_from(value: ExportQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            venue_id: parse_optional_id::<VenueId>("venueId", value.venue_id.as_deref())?,
            only_digital_venues: value.only_digital_venues,
            offer_id: parse_optional_id::<OfferId>("offerId", value.offer_id.as_deref())?,
            date_from: parse_optional_datetime("dateFrom", value.date_from.as_deref())?,
            date_to: parse_optional_datetime("dateTo", value.date_to.as_deref())?,
        })
    }
}

fn ensure_cancellation(body: &Map<String, Value>) -> Result<(), Error> {
    reject_unknown_keys(body, &["isCancelled"])?;
    match body.get("isCancelled") {
        Some(Value::Bool(true)) => Ok(()),
        Some(_) => Err(Error::invalid_request("isCancelled", CANCEL_ONLY_MESSAGE)),
        None => Err(Error::invalid_request("isCancelled", REQUIRED_MESSAGE)),
    }
}

/// Book places on a stock for the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = BookingRequestBody,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Booking refused", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "createBooking",
    security(("SessionCookie" = []))
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BookingRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let BookingRequestBody { stock_id, quantity } = payload.into_inner();
    let stock_id = parse_stock_id(stock_id.as_deref())?;
    let booking = state
        .bookings
        .create(&user_id, &stock_id, quantity.unwrap_or(1))
        .await?;
    Ok(HttpResponse::Created().json(BookingResponse::from(booking)))
}

/// Bookings of the signed-in user, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    responses(
        (status = 200, description = "Bookings", body = [UserBookingResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "listBookings",
    security(("SessionCookie" = []))
)]
#[get("/bookings")]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserBookingResponse>>> {
    let user_id = session.require_user_id()?;
    let views = state.bookings.list_for_user(&user_id).await?;
    Ok(web::Json(views.into_iter().map(Into::into).collect()))
}

/// Export bookings on the user's offerers as CSV.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/csv",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "exportBookings",
    security(("SessionCookie" = []))
)]
#[get("/bookings/csv")]
pub async fn export_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ExportQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let filter = BookingExportFilter::try_from(query.into_inner())?;
    let export = state.bookings.export(&user_id, filter).await?;
    let body = render_bookings_csv(&export.rows, export.generated_at)?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, CSV_CONTENT_TYPE))
        .insert_header((header::CONTENT_DISPOSITION, CSV_CONTENT_DISPOSITION))
        .body(body))
}

/// Cancel a booking.
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}",
    params(("id" = String, Path, description = "Booking identifier")),
    request_body(content = Object, description = "`{\"isCancelled\": true}`"),
    responses(
        (status = 200, description = "Booking cancelled", body = UserBookingResponse),
        (status = 400, description = "Cancellation refused", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "cancelBooking",
    security(("SessionCookie" = []))
)]
#[patch("/bookings/{id}")]
pub async fn cancel_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<web::Json<UserBookingResponse>> {
    let user_id = session.require_user_id()?;
    let id: BookingId = parse_path_id(&path)?;
    ensure_cancellation(&payload)?;
    let view = state.bookings.cancel(&user_id, &id).await?;
    Ok(web::Json(view.into()))
}

/// Look up the booking behind a counter-mark.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/token/{token}",
    params(("token" = String, Path, description = "Counter-mark"), TokenQuery),
    responses(
        (status = 200, description = "Booking summary", body = TokenBookingResponse),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown counter-mark", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "getBookingByToken",
    security(("SessionCookie" = []))
)]
#[get("/bookings/token/{token}")]
pub async fn get_booking_by_token(
    state: web::Data<HttpState>,
    session: SessionContext,
    token: web::Path<String>,
    query: web::Query<TokenQuery>,
) -> ApiResult<web::Json<TokenBookingResponse>> {
    let user_id = session.require_user_id()?;
    let check = TokenCheck::try_from(query.into_inner())?;
    let details = state.bookings.find_by_token(&user_id, &token, check).await?;
    Ok(web::Json(details.into()))
}

/// Validate a counter-mark, marking the booking used.
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/token/{token}",
    params(("token" = String, Path, description = "Counter-mark"), TokenQuery),
    responses(
        (status = 204, description = "Booking validated"),
        (status = 403, description = "Forbidden or too early", body = ErrorSchema),
        (status = 404, description = "Unknown counter-mark", body = ErrorSchema),
        (status = 405, description = "Account already activated", body = ErrorSchema),
        (status = 410, description = "Booking cancelled or already used", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "validateBookingToken",
    security(("SessionCookie" = []))
)]
#[patch("/bookings/token/{token}")]
pub async fn validate_booking_token(
    state: web::Data<HttpState>,
    session: SessionContext,
    token: web::Path<String>,
    query: web::Query<TokenQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let check = TokenCheck::try_from(query.into_inner())?;
    state
        .bookings
        .validate_token(&user_id, &token, check)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "bookings_tests.rs"]
mod tests;
