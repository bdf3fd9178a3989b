//! Feature toggles of the deployment, readable without a session.
//!
//! ```text
//! GET /api/v1/features
//! ```

use actix_web::{get, web};

use crate::inbound::http::dto::FeatureResponse;
use crate::inbound::http::state::HttpState;

/// Every feature toggle with its state.
#[utoipa::path(
    get,
    path = "/api/v1/features",
    responses(
        (status = 200, description = "Feature toggles", body = [FeatureResponse])
    ),
    tags = ["features"],
    operation_id = "listFeatures",
    security([])
)]
#[get("/features")]
pub async fn list_features(state: web::Data<HttpState>) -> web::Json<Vec<FeatureResponse>> {
    web::Json(
        state
            .features
            .features()
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureFlags, FeatureToggle};
    use crate::inbound::http::test_utils::MockServices;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn features_with(flags: FeatureFlags) -> (StatusCode, Value) {
        let services = MockServices {
            features: flags,
            ..MockServices::default()
        };
        let app = actix_test::init_service(
            App::new()
                .app_data(services.into_state())
                .service(web::scope("/api/v1").service(list_features)),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/features")
                .to_request(),
        )
        .await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).expect("response JSON"))
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_callers_see_every_toggle() {
        let (status, body) = features_with(FeatureFlags::default()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "nameKey": "WEBAPP_SIGNUP",
                "name": "Permettre aux bénéficiaires de créer un compte",
                "isActive": true
            }])
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn disabled_toggles_are_reported_inactive() {
        let (status, body) =
            features_with(FeatureFlags::with_disabled([FeatureToggle::WebappSignup])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["nameKey"], "WEBAPP_SIGNUP");
        assert_eq!(body[0]["isActive"], false);
    }
}
