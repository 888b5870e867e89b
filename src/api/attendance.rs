use axum::{
    Extension, Json,
    extract::{Multipart, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::upload::PhotoForm;
use super::{ApiError, ApiResponse, AppState};
use crate::clients::face_recognition::VerifyError;
use crate::models::attendance::Attendance;
use crate::services::AttendanceError;

impl From<AttendanceError> for ApiError {
    fn from(err: AttendanceError) -> Self {
        match err {
            AttendanceError::NoClockIn => Self::rejected("no_clock_in", err.to_string()),
            AttendanceError::FaceMismatch => Self::rejected("face_mismatch", err.to_string()),
            AttendanceError::Verification(e) => match e {
                VerifyError::Timeout => Self::external("Face recognition", "request timed out"),
                other => Self::external("Face recognition", other.to_string()),
            },
            AttendanceError::Upstream(e) => Self::external("Photo storage", e.to_string()),
            AttendanceError::Validation(msg) => Self::ValidationError(msg),
            AttendanceError::Database(msg) => Self::DatabaseError(msg),
            AttendanceError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<DateTime<Utc>, ApiError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{name} is required")))?;

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::validation(format!("invalid {name}, expected RFC3339")))
}

/// POST /attendance/clock-in
///
/// Multipart form with `photo` and `location`.
pub async fn clock_in(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Attendance>>, ApiError> {
    let mut form = PhotoForm::read(multipart).await?;
    let photo = form.require_photo()?;
    let location = form.require_location()?;

    let record = state
        .attendance_service()
        .clock_in(&user_id, photo, &location)
        .await?;

    Ok(Json(ApiResponse::success(record)))
}

/// POST /attendance/clock-out
pub async fn clock_out(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Attendance>>, ApiError> {
    let mut form = PhotoForm::read(multipart).await?;
    let photo = form.require_photo()?;
    let location = form.require_location()?;

    let record = state
        .attendance_service()
        .clock_out(&user_id, photo, &location)
        .await?;

    Ok(Json(ApiResponse::success(record)))
}

/// GET /attendance/today
///
/// `data` is `null` when the user has not clocked in today.
pub async fn today(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Option<Attendance>>>, ApiError> {
    let record = state.attendance_service().today(&user_id).await?;
    Ok(Json(ApiResponse::success(record)))
}

/// GET /attendance/history?start_date=..&end_date=..
pub async fn history(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<Attendance>>>, ApiError> {
    let start = parse_bound("start_date", query.start_date.as_deref())?;
    let end = parse_bound("end_date", query.end_date.as_deref())?;

    let records = state
        .attendance_service()
        .history(&user_id, start, end)
        .await?;

    Ok(Json(ApiResponse::success(records)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_accept_offsets() {
        let bound = parse_bound("start_date", Some("2025-03-01T07:00:00+07:00")).unwrap();
        assert_eq!(bound.to_rfc3339(), "2025-03-01T00:00:00+00:00");
    }

    #[test]
    fn bounds_reject_missing_or_malformed() {
        assert!(parse_bound("start_date", None).is_err());
        assert!(parse_bound("start_date", Some("2025-03-01")).is_err());
    }
}
