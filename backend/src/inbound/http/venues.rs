//! Venue HTTP handlers.
//!
//! ```text
//! POST /api/v1/venues
//! GET /api/v1/venues/{id}
//! PUT /api/v1/venues/{id}/offers/activate
//! PUT /api/v1/venues/{id}/offers/deactivate
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, OffererId, RawCoordinate, VenueDraft, VenueId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{OfferDetailResponse, VenueResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_optional_id, parse_path_id};

/// Request body for a new venue.
///
/// Coordinates may be sent as numbers or as text; unparsable text is
/// reported per field.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct VenueRequestBody {
    pub managing_offerer_id: Option<String>,
    pub name: String,
    pub public_name: Option<String>,
    #[schema(example = "12345678900012")]
    pub siret: Option<String>,
    pub comment: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub booking_email: Option<String>,
    #[schema(value_type = Option<f64>, example = 48.85)]
    pub latitude: Option<RawCoordinate>,
    #[schema(value_type = Option<f64>, example = 2.35)]
    pub longitude: Option<RawCoordinate>,
    pub is_virtual: bool,
}

impl TryFrom<VenueRequestBody> for VenueDraft {
    type Error = Error;

    fn try_from(value: VenueRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            managing_offerer_id: parse_optional_id::<OffererId>(
                "managingOffererId",
                value.managing_offerer_id.as_deref(),
            )?,
            name: value.name,
            public_name: value.public_name,
            siret: value.siret,
            comment: value.comment,
            address: value.address,
            postal_code: value.postal_code,
            city: value.city,
            booking_email: value.booking_email,
            latitude: value.latitude,
            longitude: value.longitude,
            is_virtual: value.is_virtual,
        })
    }
}

/// Create a venue for an offerer the user edits.
#[utoipa::path(
    post,
    path = "/api/v1/venues",
    request_body = VenueRequestBody,
    responses(
        (status = 201, description = "Venue created", body = VenueResponse),
        (status = 400, description = "Invalid venue", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["venues"],
    operation_id = "createVenue",
    security(("SessionCookie" = []))
)]
#[post("/venues")]
pub async fn create_venue(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VenueRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let draft = VenueDraft::try_from(payload.into_inner())?;
    let venue = state.venues.create(&user_id, draft).await?;
    Ok(HttpResponse::Created().json(VenueResponse::from(venue)))
}

/// One venue.
#[utoipa::path(
    get,
    path = "/api/v1/venues/{id}",
    params(("id" = String, Path, description = "Venue identifier")),
    responses(
        (status = 200, description = "Venue", body = VenueResponse),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["venues"],
    operation_id = "getVenue",
    security(("SessionCookie" = []))
)]
#[get("/venues/{id}")]
pub async fn get_venue(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<VenueResponse>> {
    let user_id = session.require_user_id()?;
    let id: VenueId = parse_path_id(&path)?;
    let venue = state.venues.get(&user_id, &id).await?;
    Ok(web::Json(venue.into()))
}

async fn set_offers_active(
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    is_active: bool,
) -> ApiResult<web::Json<Vec<OfferDetailResponse>>> {
    let user_id = session.require_user_id()?;
    let id: VenueId = parse_path_id(raw_id)?;
    let offers = state
        .venues
        .set_offers_active(&user_id, &id, is_active)
        .await?;
    Ok(web::Json(offers.into_iter().map(Into::into).collect()))
}

/// Activate every offer of a venue.
#[utoipa::path(
    put,
    path = "/api/v1/venues/{id}/offers/activate",
    params(("id" = String, Path, description = "Venue identifier")),
    responses(
        (status = 200, description = "Offers activated", body = [OfferDetailResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["venues"],
    operation_id = "activateVenueOffers",
    security(("SessionCookie" = []))
)]
#[put("/venues/{id}/offers/activate")]
pub async fn activate_venue_offers(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<OfferDetailResponse>>> {
    set_offers_active(&state, &session, &path, true).await
}

/// Deactivate every offer of a venue.
#[utoipa::path(
    put,
    path = "/api/v1/venues/{id}/offers/deactivate",
    params(("id" = String, Path, description = "Venue identifier")),
    responses(
        (status = 200, description = "Offers deactivated", body = [OfferDetailResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["venues"],
    operation_id = "deactivateVenueOffers",
    security(("SessionCookie" = []))
)]
#[put("/venues/{id}/offers/deactivate")]
pub async fn deactivate_venue_offers(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<OfferDetailResponse>>> {
    set_offers_active(&state, &session, &path, false).await
}
