//! Account HTTP handlers: sign-in, sign-up, profile and password recovery.
//!
//! ```text
//! POST /api/v1/users/signin {"identifier":"jeune@example.com","password":"..."}
//! GET /api/v1/users/current
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SignUpRequest;
use crate::domain::{
    ErrorCode, ErrorCollector, FeatureToggle, LoginCredentials, LoginValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{UserProfileResponse, UserResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::take_required;

/// Sign-in request body for `POST /api/v1/users/signin`.
///
/// Missing keys are treated as empty strings so they surface as the usual
/// "missing identifier" and "missing password" failures.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[serde(default)]
    #[schema(example = "jeune@example.com")]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<SignInRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: SignInRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.identifier, &value.password)
    }
}

/// Sign-up request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequestBody {
    pub email: Option<String>,
    pub password: Option<String>,
    pub public_name: Option<String>,
    #[schema(example = "93")]
    pub departement_code: Option<String>,
}

impl TryFrom<SignUpRequestBody> for SignUpRequest {
    type Error = crate::domain::Error;

    fn try_from(value: SignUpRequestBody) -> Result<Self, Self::Error> {
        let mut errors = ErrorCollector::new();
        let email = take_required(&mut errors, "email", value.email);
        let password = take_required(&mut errors, "password", value.password);
        let public_name = take_required(&mut errors, "publicName", value.public_name);
        let departement_code =
            take_required(&mut errors, "departementCode", value.departement_code);
        errors.into_result(ErrorCode::InvalidRequest)?;
        Ok(Self {
            email: email.unwrap_or_default(),
            password: password.unwrap_or_default(),
            public_name: public_name.unwrap_or_default(),
            departement_code: departement_code.unwrap_or_default(),
        })
    }
}

/// Password reset request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
}

/// New password request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

/// Authenticate a user and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/users/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = UserProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "signIn",
    security([])
)]
#[post("/users/signin")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignInRequest>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let profile = state.accounts.sign_in(&credentials).await?;
    session.persist_user(&profile.user.id)?;
    Ok(web::Json(profile.into()))
}

/// Drop the session.
#[utoipa::path(
    get,
    path = "/api/v1/users/signout",
    responses((status = 200, description = "Signed out")),
    tags = ["users"],
    operation_id = "signOut"
)]
#[get("/users/signout")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.forget();
    HttpResponse::Ok().finish()
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/current",
    responses(
        (status = 200, description = "Current user", body = UserProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/users/current")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let user_id = session.require_user_id()?;
    let profile = state.accounts.profile(&user_id).await?;
    Ok(web::Json(profile.into()))
}

/// Create an account awaiting e-mail validation.
#[utoipa::path(
    post,
    path = "/api/v1/users/signup",
    request_body = SignUpRequestBody,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Sign-up disabled on this deployment", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "signUp",
    security([])
)]
#[post("/users/signup")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<SignUpRequestBody>,
) -> ApiResult<HttpResponse> {
    state.features.require(FeatureToggle::WebappSignup)?;
    let request = SignUpRequest::try_from(payload.into_inner())?;
    let user = state.accounts.sign_up(request).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Send a password reset token to a known address.
#[utoipa::path(
    post,
    path = "/api/v1/users/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Request accepted"),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/users/reset-password")]
pub async fn request_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    state
        .accounts
        .request_password_reset(payload.into_inner().email)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Replace a password using a reset token.
#[utoipa::path(
    post,
    path = "/api/v1/users/new-password",
    request_body = NewPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid or expired request", body = ErrorSchema),
        (status = 404, description = "Unknown token", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/users/new-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<NewPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let NewPasswordRequest {
        token,
        new_password,
    } = payload.into_inner();
    let mut errors = ErrorCollector::new();
    let token = take_required(&mut errors, "token", token);
    let new_password = take_required(&mut errors, "newPassword", new_password);
    errors.into_result(ErrorCode::InvalidRequest)?;
    state
        .accounts
        .reset_password(
            token.as_deref().unwrap_or_default(),
            new_password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
