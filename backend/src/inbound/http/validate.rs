//! E-mail validation links for accounts, offerers and user-offerer links.
//!
//! ```text
//! GET /api/v1/validate/user/{token}
//! GET /api/v1/validate/offerer/{token}
//! GET /api/v1/validate/user-offerer/{token}
//! ```

use actix_web::{HttpResponse, get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Validate an account.
#[utoipa::path(
    get,
    path = "/api/v1/validate/user/{token}",
    params(("token" = String, Path, description = "Account validation token")),
    responses(
        (status = 204, description = "Account validated"),
        (status = 404, description = "Unknown token", body = ErrorSchema)
    ),
    tags = ["validation"],
    operation_id = "validateUser",
    security([])
)]
#[get("/validate/user/{token}")]
pub async fn validate_user(
    state: web::Data<HttpState>,
    token: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.accounts.validate_account(token.trim()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Validate an offerer.
#[utoipa::path(
    get,
    path = "/api/v1/validate/offerer/{token}",
    params(("token" = String, Path, description = "Offerer validation token")),
    responses(
        (status = 204, description = "Offerer validated"),
        (status = 404, description = "Unknown token", body = ErrorSchema)
    ),
    tags = ["validation"],
    operation_id = "validateOfferer",
    security([])
)]
#[get("/validate/offerer/{token}")]
pub async fn validate_offerer(
    state: web::Data<HttpState>,
    token: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.offerers.validate(token.trim()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Validate a link between a user and an offerer.
#[utoipa::path(
    get,
    path = "/api/v1/validate/user-offerer/{token}",
    params(("token" = String, Path, description = "Link validation token")),
    responses(
        (status = 204, description = "Link validated"),
        (status = 404, description = "Unknown token", body = ErrorSchema)
    ),
    tags = ["validation"],
    operation_id = "validateUserOfferer",
    security([])
)]
#[get("/validate/user-offerer/{token}")]
pub async fn validate_user_offerer(
    state: web::Data<HttpState>,
    token: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.offerers.validate_link(token.trim()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::inbound::http::test_utils::MockServices;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use mockall::predicate::eq;
    use rstest::rstest;

    async fn call(services: MockServices, uri: &str) -> StatusCode {
        let app = actix_test::init_service(
            App::new().app_data(services.into_state()).service(
                web::scope("/api/v1")
                    .service(validate_user)
                    .service(validate_offerer)
                    .service(validate_user_offerer),
            ),
        )
        .await;
        let request = actix_test::TestRequest::get().uri(uri).to_request();
        actix_test::call_service(&app, request).await.status()
    }

    #[rstest]
    #[case("/api/v1/validate/user/ABC123")]
    #[case("/api/v1/validate/offerer/ABC123")]
    #[case("/api/v1/validate/user-offerer/ABC123")]
    #[actix_web::test]
    async fn known_tokens_answer_no_content(#[case] uri: &str) {
        let mut services = MockServices::default();
        services
            .accounts
            .expect_validate_account()
            .with(eq("ABC123"))
            .returning(|_| Ok(()));
        services
            .offerers
            .expect_validate()
            .with(eq("ABC123"))
            .returning(|_| Ok(()));
        services
            .offerers
            .expect_validate_link()
            .with(eq("ABC123"))
            .returning(|_| Ok(()));

        assert_eq!(call(services, uri).await, StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn unknown_account_token_is_not_found() {
        let mut services = MockServices::default();
        services
            .accounts
            .expect_validate_account()
            .return_once(|_| Err(Error::not_found("global", "inconnu")));

        let status = call(services, "/api/v1/validate/user/NOPE").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
