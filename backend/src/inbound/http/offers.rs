//! Offer, stock and mediation HTTP handlers.
//!
//! ```text
//! POST /api/v1/offers {"venueId":"...","name":"...","type":"ThingType.LIVRE_EDITION"}
//! POST /api/v1/stocks {"offerId":"...","price":10}
//! PATCH /api/v1/mediations/{id} {"isActive":false}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::ports::{MediationDraft, MediationPatch};
use crate::domain::{
    Error, ErrorCode, ErrorCollector, MediationId, OfferDraft, OfferId, StockDraft, VenueId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{
    MediationResponse, OfferDetailResponse, OfferResponse, StockResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    INVALID_FORMAT_MESSAGE, parse_field_id, parse_optional_datetime, parse_optional_id,
    parse_path_id, reject_unknown_keys, take_required,
};

const EDITABLE_MEDIATION_KEYS: &[&str] = &["isActive", "credit"];

/// Request body for a new offer.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferRequestBody {
    pub venue_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "ThingType.LIVRE_EDITION")]
    pub type_code: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
}

impl TryFrom<OfferRequestBody> for OfferDraft {
    type Error = Error;

    fn try_from(value: OfferRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            venue_id: parse_optional_id::<VenueId>("venueId", value.venue_id.as_deref())?,
            name: value.name,
            type_code: value.type_code,
            url: value.url,
            description: value.description,
            duration_minutes: value.duration_minutes,
        })
    }
}

/// Request body for a new stock. Datetimes are RFC 3339 strings.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StockRequestBody {
    pub offer_id: Option<String>,
    #[schema(value_type = Option<f64>, example = 10)]
    pub price: Option<Decimal>,
    pub available: Option<i64>,
    #[schema(format = "date-time")]
    pub beginning_datetime: Option<String>,
    #[schema(format = "date-time")]
    pub end_datetime: Option<String>,
    #[schema(format = "date-time")]
    pub booking_limit_datetime: Option<String>,
}

impl TryFrom<StockRequestBody> for StockDraft {
    type Error = Error;

    fn try_from(value: StockRequestBody) -> Result<Self, Self::Error> {
        let mut errors = ErrorCollector::new();
        let price = take_required(&mut errors, "price", value.price);
        let beginning_datetime = collect(
            &mut errors,
            parse_optional_datetime("beginningDatetime", value.beginning_datetime.as_deref()),
        );
        let end_datetime = collect(
            &mut errors,
            parse_optional_datetime("endDatetime", value.end_datetime.as_deref()),
        );
        let booking_limit_datetime = collect(
            &mut errors,
            parse_optional_datetime(
                "bookingLimitDatetime",
                value.booking_limit_datetime.as_deref(),
            ),
        );
        let offer_id = collect(
            &mut errors,
            parse_optional_id::<OfferId>("offerId", value.offer_id.as_deref()),
        );
        errors.into_result(ErrorCode::InvalidRequest)?;
        Ok(Self {
            offer_id: offer_id.flatten(),
            price: price.unwrap_or_default(),
            available: value.available,
            beginning_datetime: beginning_datetime.flatten(),
            end_datetime: end_datetime.flatten(),
            booking_limit_datetime: booking_limit_datetime.flatten(),
        })
    }
}

fn collect<T>(errors: &mut ErrorCollector, result: Result<T, Error>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            for (field, messages) in error.errors() {
                for message in messages {
                    errors.add(field.clone(), message.clone());
                }
            }
            None
        }
    }
}

/// Request body for a new mediation. Thumbnails are referenced by URL.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MediationRequestBody {
    pub offer_id: Option<String>,
    pub credit: Option<String>,
    pub thumb_url: Option<String>,
}

impl TryFrom<MediationRequestBody> for MediationDraft {
    type Error = Error;

    fn try_from(value: MediationRequestBody) -> Result<Self, Self::Error> {
        let mut errors = ErrorCollector::new();
        let offer_id = take_required(&mut errors, "offerId", value.offer_id);
        errors.into_result(ErrorCode::InvalidRequest)?;
        Ok(Self {
            offer_id: parse_field_id("offerId", offer_id.as_deref().unwrap_or_default())?,
            credit: value.credit,
            thumb_url: value.thumb_url,
        })
    }
}

fn parse_mediation_patch(body: &Map<String, Value>) -> Result<MediationPatch, Error> {
    reject_unknown_keys(body, EDITABLE_MEDIATION_KEYS)?;
    let mut errors = ErrorCollector::new();
    let is_active = match body.get("isActive") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(flag)) => Some(*flag),
        Some(_) => {
            errors.add("isActive", INVALID_FORMAT_MESSAGE);
            None
        }
    };
    let credit = match body.get("credit") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            errors.add("credit", INVALID_FORMAT_MESSAGE);
            None
        }
    };
    errors.into_result(ErrorCode::InvalidRequest)?;
    Ok(MediationPatch { is_active, credit })
}

/// Publish an offer at a venue.
#[utoipa::path(
    post,
    path = "/api/v1/offers",
    request_body = OfferRequestBody,
    responses(
        (status = 201, description = "Offer created", body = OfferResponse),
        (status = 400, description = "Invalid offer", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "createOffer",
    security(("SessionCookie" = []))
)]
#[post("/offers")]
pub async fn create_offer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OfferRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let draft = OfferDraft::try_from(payload.into_inner())?;
    let offer = state.offers.create_offer(&user_id, draft).await?;
    Ok(HttpResponse::Created().json(OfferResponse::from(offer)))
}

/// Active offers visible from the user's department.
#[utoipa::path(
    get,
    path = "/api/v1/offers",
    responses(
        (status = 200, description = "Offers", body = [OfferResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "listOffers",
    security(("SessionCookie" = []))
)]
#[get("/offers")]
pub async fn list_offers(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OfferResponse>>> {
    let user_id = session.require_user_id()?;
    let offers = state.offers.list_offers(&user_id).await?;
    Ok(web::Json(offers.into_iter().map(Into::into).collect()))
}

/// One offer with its stocks.
#[utoipa::path(
    get,
    path = "/api/v1/offers/{id}",
    params(("id" = String, Path, description = "Offer identifier")),
    responses(
        (status = 200, description = "Offer", body = OfferDetailResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "getOffer",
    security(("SessionCookie" = []))
)]
#[get("/offers/{id}")]
pub async fn get_offer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OfferDetailResponse>> {
    session.require_user_id()?;
    let id: OfferId = parse_path_id(&path)?;
    let view = state.offers.get_offer(&id).await?;
    Ok(web::Json(view.into()))
}

/// Add a stock to an offer.
#[utoipa::path(
    post,
    path = "/api/v1/stocks",
    request_body = StockRequestBody,
    responses(
        (status = 201, description = "Stock created", body = StockResponse),
        (status = 400, description = "Invalid stock", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "createStock",
    security(("SessionCookie" = []))
)]
#[post("/stocks")]
pub async fn create_stock(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StockRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let draft = StockDraft::try_from(payload.into_inner())?;
    let stock = state.offers.create_stock(&user_id, draft).await?;
    Ok(HttpResponse::Created().json(StockResponse::from(stock)))
}

/// Illustrate an offer.
#[utoipa::path(
    post,
    path = "/api/v1/mediations",
    request_body = MediationRequestBody,
    responses(
        (status = 201, description = "Mediation created", body = MediationResponse),
        (status = 400, description = "Invalid mediation", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "createMediation",
    security(("SessionCookie" = []))
)]
#[post("/mediations")]
pub async fn create_mediation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<MediationRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let draft = MediationDraft::try_from(payload.into_inner())?;
    let mediation = state.offers.create_mediation(&user_id, draft).await?;
    Ok(HttpResponse::Created().json(MediationResponse::from(mediation)))
}

/// One mediation.
#[utoipa::path(
    get,
    path = "/api/v1/mediations/{id}",
    params(("id" = String, Path, description = "Mediation identifier")),
    responses(
        (status = 200, description = "Mediation", body = MediationResponse),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "getMediation",
    security(("SessionCookie" = []))
)]
#[get("/mediations/{id}")]
pub async fn get_mediation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<MediationResponse>> {
    let user_id = session.require_user_id()?;
    let id: MediationId = parse_path_id(&path)?;
    let mediation = state.offers.get_mediation(&user_id, &id).await?;
    Ok(web::Json(mediation.into()))
}

/// Edit a mediation's `isActive` flag or credit.
#[utoipa::path(
    patch,
    path = "/api/v1/mediations/{id}",
    params(("id" = String, Path, description = "Mediation identifier")),
    request_body(content = Object, description = "`isActive` and `credit` only"),
    responses(
        (status = 200, description = "Mediation updated", body = MediationResponse),
        (status = 400, description = "Field not editable", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "patchMediation",
    security(("SessionCookie" = []))
)]
#[patch("/mediations/{id}")]
pub async fn patch_mediation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<web::Json<MediationResponse>> {
    let user_id = session.require_user_id()?;
    let id: MediationId = parse_path_id(&path)?;
    let patch = parse_mediation_patch(&payload)?;
    let mediation = state.offers.update_mediation(&user_id, &id, patch).await?;
    Ok(web::Json(mediation.into()))
}
