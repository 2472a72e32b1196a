use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::db::queries;
use crate::errors::AppError;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_reference): Path<String>,
) -> Result<Response, AppError> {
    let reference = raw_reference
        .strip_suffix(".ics")
        .unwrap_or(&raw_reference);

    let appointment = {
        let conn = state.conn()?;
        queries::get_appointment(&conn, reference)?
    }
    .ok_or_else(|| AppError::NotFound(format!("appointment {reference}")))?;

    let ics = generate_ics(&appointment).ok_or_else(|| {
        anyhow::anyhow!(
            "appointment {reference} has an unreadable date/time: {} {}",
            appointment.date,
            appointment.time
        )
    })?;

    let disposition = format!("attachment; filename=\"appointment-{reference}.ics\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        ics,
    )
        .into_response())
}
