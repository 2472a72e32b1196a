use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Appointment, Doctor, Slot, SlotKey};
use crate::services::schedule;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/appointments
#[derive(Deserialize)]
pub struct AppointmentsQuery {
    pub limit: Option<i64>,
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let conn = state.conn()?;
    Ok(Json(queries::list_appointments(&conn, limit)?))
}

// GET /api/admin/appointments/:reference
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(reference): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let conn = state.conn()?;
    queries::get_appointment(&conn, &reference)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("appointment {reference}")))
}

// GET /api/admin/slots
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub doctor: String,
    pub date: String,
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<Slot>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let doctor = Doctor::parse(&query.doctor)
        .ok_or_else(|| AppError::BadRequest(format!("unknown doctor: {}", query.doctor)))?;
    let conn = state.conn()?;
    Ok(Json(queries::list_day_slots(&conn, doctor.name(), &query.date)?))
}

// POST /api/admin/schedule
#[derive(Deserialize)]
pub struct ScheduleRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub times: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    pub created: usize,
}

pub async fn generate_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    schedule::validate_range(body.start, body.end)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let times = body.times.unwrap_or_else(schedule::default_times);
    schedule::validate_times(&times).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut conn = state.conn()?;
    let created = schedule::generate_schedule(
        &mut conn,
        &schedule::default_templates(),
        &times,
        body.start,
        body.end,
    )?;
    Ok(Json(ScheduleResponse { created }))
}

// GET /api/admin/reconcile
#[derive(Serialize)]
pub struct ReconcileResponse {
    pub orphaned_slots: Vec<SlotKey>,
}

pub async fn reconcile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ReconcileResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let conn = state.conn()?;
    let orphaned_slots = queries::find_orphaned_slots(&conn)?;
    if !orphaned_slots.is_empty() {
        tracing::warn!(count = orphaned_slots.len(), "booked slots without an appointment");
    }
    Ok(Json(ReconcileResponse { orphaned_slots }))
}
