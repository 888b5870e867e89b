use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::assets::AssetStore;
use crate::clients::face_recognition::{FaceVerifier, VerifyError};
use crate::db::{DayInsert, Store, timestamp};
use crate::models::attendance::{Attendance, Punch};
use crate::models::photo::Photo;
use crate::services::attendance_service::{AttendanceError, AttendanceService};
use crate::services::clock::Clock;

const ATTENDANCE_FOLDER: &str = "attendance";

pub struct SeaOrmAttendanceService {
    store: Store,
    verifier: Arc<dyn FaceVerifier>,
    assets: Arc<dyn AssetStore>,
    clock: Arc<dyn Clock>,
}

impl SeaOrmAttendanceService {
    #[must_use]
    pub fn new(
        store: Store,
        verifier: Arc<dyn FaceVerifier>,
        assets: Arc<dyn AssetStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            verifier,
            assets,
            clock,
        }
    }

    fn work_date(&self) -> String {
        self.clock.today().format("%Y-%m-%d").to_string()
    }

    fn check_input(photo: &Photo, location: &str) -> Result<(), AttendanceError> {
        if photo.is_empty() {
            return Err(AttendanceError::Validation("Photo is required".to_string()));
        }
        if location.trim().is_empty() {
            return Err(AttendanceError::Validation(
                "Location is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Verifies the face and only then stores the photo. Returns the stored photo URL.
    async fn verify_and_store(&self, user_id: &str, photo: &Photo) -> Result<String, AttendanceError> {
        let verdict = match self.verifier.verify(photo, user_id).await {
            Ok(verdict) => verdict,
            Err(e) => {
                let result = if matches!(e, VerifyError::Timeout) {
                    "timeout"
                } else {
                    "unavailable"
                };
                metrics::counter!("attendance_verifications_total", "result" => result)
                    .increment(1);
                warn!(user_id, error = %e, "Face verification unavailable");
                return Err(AttendanceError::Verification(e));
            }
        };

        let result = if verdict.verified { "verified" } else { "mismatch" };
        metrics::counter!("attendance_verifications_total", "result" => result).increment(1);

        if !verdict.verified {
            info!(
                user_id,
                similarity = ?verdict.similarity,
                threshold = ?verdict.threshold,
                "Face mismatch"
            );
            return Err(AttendanceError::FaceMismatch);
        }

        debug!(
            user_id,
            similarity = ?verdict.similarity,
            threshold = ?verdict.threshold,
            "Face verified"
        );

        Ok(self.assets.upload(photo, ATTENDANCE_FOLDER).await?)
    }
}

#[async_trait]
impl AttendanceService for SeaOrmAttendanceService {
    async fn clock_in(
        &self,
        user_id: &str,
        photo: Photo,
        location: &str,
    ) -> Result<Attendance, AttendanceError> {
        Self::check_input(&photo, location)?;

        let photo_url = self.verify_and_store(user_id, &photo).await?;

        let work_date = self.work_date();
        let punch = Punch {
            at: timestamp(self.clock.now()),
            photo_url,
            location: location.trim().to_string(),
        };

        if let Some(record) = self
            .store
            .update_clock_in(user_id, &work_date, &punch)
            .await?
        {
            info!(user_id, attendance_id = %record.id, "Clock-in corrected");
            return Ok(record);
        }

        let record = match self
            .store
            .insert_clock_in(user_id, &work_date, &punch)
            .await?
        {
            DayInsert::Inserted(record) => record,
            DayInsert::AlreadyExists => {
                debug!(user_id, work_date = %work_date, "Concurrent clock-in, updating existing row");
                self.store
                    .update_clock_in(user_id, &work_date, &punch)
                    .await?
                    .ok_or_else(|| {
                        AttendanceError::Internal("attendance row vanished after conflict".into())
                    })?
            }
        };

        info!(user_id, attendance_id = %record.id, "Clocked in");
        Ok(record)
    }

    async fn clock_out(
        &self,
        user_id: &str,
        photo: Photo,
        location: &str,
    ) -> Result<Attendance, AttendanceError> {
        Self::check_input(&photo, location)?;

        let work_date = self.work_date();
        if self
            .store
            .attendance_for_day(user_id, &work_date)
            .await?
            .is_none()
        {
            return Err(AttendanceError::NoClockIn);
        }

        let photo_url = self.verify_and_store(user_id, &photo).await?;

        let punch = Punch {
            at: timestamp(self.clock.now()),
            photo_url,
            location: location.trim().to_string(),
        };

        let record = self
            .store
            .update_clock_out(user_id, &work_date, &punch)
            .await?
            .ok_or(AttendanceError::NoClockIn)?;

        if let (Some(clock_in), Some(clock_out)) = (&record.clock_in, &record.clock_out)
            && clock_out < clock_in
        {
            debug!(user_id, attendance_id = %record.id, "Clock-out precedes clock-in");
        }

        info!(user_id, attendance_id = %record.id, "Clocked out");
        Ok(record)
    }

    async fn today(&self, user_id: &str) -> Result<Option<Attendance>, AttendanceError> {
        Ok(self
            .store
            .attendance_for_day(user_id, &self.work_date())
            .await?)
    }

    async fn history(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Attendance>, AttendanceError> {
        if start > end {
            return Err(AttendanceError::Validation(
                "start_date must not be after end_date".to_string(),
            ));
        }

        Ok(self
            .store
            .attendance_history(user_id, &timestamp(start), &timestamp(end))
            .await?)
    }
}
