//! Offerer and user-offerer HTTP handlers.
//!
//! ```text
//! POST /api/v1/offerers {"name":"...","siren":"123456789",...}
//! PATCH /api/v1/offerers/{id} {"isActive":false}
//! POST /api/v1/userOfferers {"userId":"...","offererId":"...","rights":"editor"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::ports::{NewUserOfferer, OffererDraft};
use crate::domain::{Error, ErrorCode, ErrorCollector, OffererId, RightsType, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{OffererResponse, UserOffererResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    INVALID_FORMAT_MESSAGE, REQUIRED_MESSAGE, parse_field_id, parse_path_id, reject_unknown_keys,
    take_required,
};

const EDITABLE_OFFERER_KEYS: &[&str] = &["isActive"];

/// Request body for a new offerer.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OffererRequestBody {
    pub name: String,
    #[schema(example = "123456789")]
    pub siren: String,
    pub address: Option<String>,
    pub postal_code: String,
    pub city: String,
}

impl From<OffererRequestBody> for OffererDraft {
    fn from(value: OffererRequestBody) -> Self {
        Self {
            name: value.name,
            siren: value.siren,
            address: value.address,
            postal_code: value.postal_code,
            city: value.city,
        }
    }
}

/// Request body linking a user to an offerer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserOffererRequestBody {
    pub user_id: Option<String>,
    pub offerer_id: Option<String>,
    #[schema(example = "editor")]
    pub rights: Option<String>,
}

impl TryFrom<UserOffererRequestBody> for NewUserOfferer {
    type Error = Error;

    fn try_from(value: UserOffererRequestBody) -> Result<Self, Self::Error> {
        let mut errors = ErrorCollector::new();
        let user_id = take_required(&mut errors, "userId", value.user_id);
        let offerer_id = take_required(&mut errors, "offererId", value.offerer_id);
        errors.into_result(ErrorCode::InvalidRequest)?;
        let rights = match value.rights.as_deref() {
            Some(raw) => raw.parse::<RightsType>()?,
            None => RightsType::Editor,
        };
        Ok(Self {
            user_id: parse_field_id::<UserId>("userId", user_id.as_deref().unwrap_or_default())?,
            offerer_id: parse_field_id::<OffererId>(
                "offererId",
                offerer_id.as_deref().unwrap_or_default(),
            )?,
            rights,
        })
    }
}

fn parse_is_active(body: &Map<String, Value>) -> Result<bool, Error> {
    reject_unknown_keys(body, EDITABLE_OFFERER_KEYS)?;
    match body.get("isActive") {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(Error::invalid_request("isActive", INVALID_FORMAT_MESSAGE)),
        None => Err(Error::invalid_request("isActive", REQUIRED_MESSAGE)),
    }
}

/// Create an offerer, or ask to join it when the SIREN is already known.
#[utoipa::path(
    post,
    path = "/api/v1/offerers",
    request_body = OffererRequestBody,
    responses(
        (status = 201, description = "Offerer created or joined", body = OffererResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["offerers"],
    operation_id = "createOfferer",
    security(("SessionCookie" = []))
)]
#[post("/offerers")]
pub async fn create_offerer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OffererRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let view = state
        .offerers
        .create(&user_id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(OffererResponse::from(view)))
}

/// Offerers linked to the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/offerers",
    responses(
        (status = 200, description = "Offerers", body = [OffererResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["offerers"],
    operation_id = "listOfferers",
    security(("SessionCookie" = []))
)]
#[get("/offerers")]
pub async fn list_offerers(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OffererResponse>>> {
    let user_id = session.require_user_id()?;
    let views = state.offerers.list(&user_id).await?;
    Ok(web::Json(views.into_iter().map(Into::into).collect()))
}

/// One offerer with its venues.
#[utoipa::path(
    get,
    path = "/api/v1/offerers/{id}",
    params(("id" = String, Path, description = "Offerer identifier")),
    responses(
        (status = 200, description = "Offerer", body = OffererResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["offerers"],
    operation_id = "getOfferer",
    security(("SessionCookie" = []))
)]
#[get("/offerers/{id}")]
pub async fn get_offerer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OffererResponse>> {
    let user_id = session.require_user_id()?;
    let id: OffererId = parse_path_id(&path)?;
    let view = state.offerers.get(&user_id, &id).await?;
    Ok(web::Json(view.into()))
}

/// Toggle an offerer's `isActive` flag.
#[utoipa::path(
    patch,
    path = "/api/v1/offerers/{id}",
    params(("id" = String, Path, description = "Offerer identifier")),
    request_body(content = Object, description = "Only `isActive` may be sent"),
    responses(
        (status = 200, description = "Offerer updated", body = OffererResponse),
        (status = 400, description = "Field not editable", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["offerers"],
    operation_id = "patchOfferer",
    security(("SessionCookie" = []))
)]
#[patch("/offerers/{id}")]
pub async fn patch_offerer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<web::Json<OffererResponse>> {
    let user_id = session.require_user_id()?;
    let id: OffererId = parse_path_id(&path)?;
    let is_active = parse_is_active(&payload)?;
    let view = state.offerers.set_active(&user_id, &id, is_active).await?;
    Ok(web::Json(view.into()))
}

/// Links between the signed-in user and an offerer.
#[utoipa::path(
    get,
    path = "/api/v1/userOfferers/{offererId}",
    params(("offererId" = String, Path, description = "Offerer identifier")),
    responses(
        (status = 200, description = "Links", body = [UserOffererResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["offerers"],
    operation_id = "listUserOfferers",
    security(("SessionCookie" = []))
)]
#[get("/userOfferers/{offerer_id}")]
pub async fn list_user_offerers(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<UserOffererResponse>>> {
    let user_id = session.require_user_id()?;
    let offerer_id: OffererId = parse_path_id(&path)?;
    let links = state.offerers.links(&user_id, &offerer_id).await?;
    Ok(web::Json(links.into_iter().map(Into::into).collect()))
}

/// Link a user to an offerer, pending validation.
#[utoipa::path(
    post,
    path = "/api/v1/userOfferers",
    request_body = UserOffererRequestBody,
    responses(
        (status = 201, description = "Link created", body = UserOffererResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["offerers"],
    operation_id = "createUserOfferer",
    security(("SessionCookie" = []))
)]
#[post("/userOfferers")]
pub async fn create_user_offerer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UserOffererRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let request = NewUserOfferer::try_from(payload.into_inner())?;
    let link = state.offerers.add_link(&user_id, request).await?;
    Ok(HttpResponse::Created().json(UserOffererResponse::from(link)))
}
