//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers stay thin: they parse the request into domain types, call one
//! driving port held in [`state::HttpState`] and map the result back to DTOs.

use actix_web::web;

pub mod app;
pub mod bookings;
pub(crate) mod bookings_csv;
pub mod dto;
pub mod error;
pub mod features;
pub mod health;
pub mod offerers;
pub mod offers;
pub mod payments;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validate;
pub mod validation;
pub mod venues;

pub use app::{AppDependencies, build_app};
pub use error::ApiResult;

/// Register every API handler on `cfg`.
///
/// Callers mount the result under `/api/v1`:
///
/// ```rust,no_run
/// use actix_web::{App, web};
/// use backend::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::query_config())
        .service(features::list_features)
        .service(users::sign_in)
        .service(users::sign_out)
        .service(users::current_user)
        .service(users::sign_up)
        .service(users::request_password_reset)
        .service(users::reset_password)
        .service(validate::validate_user)
        .service(validate::validate_offerer)
        .service(validate::validate_user_offerer)
        .service(offerers::create_offerer)
        .service(offerers::list_offerers)
        .service(offerers::get_offerer)
        .service(offerers::patch_offerer)
        .service(offerers::list_user_offerers)
        .service(offerers::create_user_offerer)
        .service(venues::create_venue)
        .service(venues::get_venue)
        .service(venues::activate_venue_offers)
        .service(venues::deactivate_venue_offers)
        .service(offers::create_offer)
        .service(offers::list_offers)
        .service(offers::get_offer)
        .service(offers::create_stock)
        .service(offers::create_mediation)
        .service(offers::get_mediation)
        .service(offers::patch_mediation)
        .service(bookings::export_bookings)
        .service(bookings::create_booking)
        .service(bookings::list_bookings)
        .service(bookings::get_booking_by_token)
        .service(bookings::validate_booking_token)
        .service(bookings::cancel_booking)
        .service(payments::list_payments)
        .service(payments::get_payment_message)
        .service(payments::append_payment_status);
}
