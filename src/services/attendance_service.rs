//! Domain service for face-verified clock-in and clock-out.
//!
//! Each user has at most one attendance row per calendar day. The first
//! clock-in of the day creates it; later clock-ins and the clock-out
//! mutate it in place. Nothing is written before the recognition service
//! confirms the face.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::clients::assets::AssetError;
use crate::clients::face_recognition::VerifyError;
use crate::models::attendance::Attendance;
use crate::models::photo::Photo;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("No clock in found for today")]
    NoClockIn,

    #[error("Face does not match the registered user")]
    FaceMismatch,

    #[error("Face verification failed: {0}")]
    Verification(#[from] VerifyError),

    #[error("Photo upload failed: {0}")]
    Upstream(#[from] AssetError),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AttendanceError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AttendanceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AttendanceService: Send + Sync {
    /// Verifies the face, stores the photo, then creates or overwrites today's clock-in.
    async fn clock_in(
        &self,
        user_id: &str,
        photo: Photo,
        location: &str,
    ) -> Result<Attendance, AttendanceError>;

    /// Requires today's record, then verifies the face and sets the clock-out side.
    ///
    /// # Errors
    ///
    /// Returns [`AttendanceError::NoClockIn`] without contacting any collaborator
    /// when there is no record for today.
    async fn clock_out(
        &self,
        user_id: &str,
        photo: Photo,
        location: &str,
    ) -> Result<Attendance, AttendanceError>;

    /// Today's record, if any. Absence is not an error.
    async fn today(&self, user_id: &str) -> Result<Option<Attendance>, AttendanceError>;

    /// Records created within the inclusive range. Callers must not rely on the order.
    async fn history(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Attendance>, AttendanceError>;
}
