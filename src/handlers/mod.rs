pub mod admin;
pub mod calendar;
pub mod fulfillment;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/fulfillment", post(fulfillment::fulfillment_hook))
        .route("/api/admin/appointments", get(admin::list_appointments))
        .route(
            "/api/admin/appointments/:reference",
            get(admin::get_appointment),
        )
        .route("/api/admin/slots", get(admin::get_slots))
        .route("/api/admin/schedule", post(admin::generate_schedule))
        .route("/api/admin/reconcile", get(admin::reconcile))
        .route("/calendar/:reference", get(calendar::download_ics))
        .with_state(state)
}
