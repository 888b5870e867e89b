use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};

use crate::entities::{attendance, prelude::*};
use crate::models::attendance::{Attendance as AttendanceRecord, Punch};

/// Result of inserting the first record of a day.
#[derive(Debug)]
pub enum DayInsert {
    Inserted(AttendanceRecord),
    /// Another request created the day's row first.
    AlreadyExists,
}

pub struct AttendanceRepository {
    conn: DatabaseConnection,
}

impl AttendanceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn find_model(&self, user_id: &str, work_date: &str) -> Result<Option<attendance::Model>> {
        Attendance::find()
            .filter(attendance::Column::UserId.eq(user_id))
            .filter(attendance::Column::WorkDate.eq(work_date))
            .one(&self.conn)
            .await
            .context("Failed to query attendance for day")
    }

    pub async fn find_for_day(
        &self,
        user_id: &str,
        work_date: &str,
    ) -> Result<Option<AttendanceRecord>> {
        Ok(self
            .find_model(user_id, work_date)
            .await?
            .map(AttendanceRecord::from))
    }

    pub async fn insert_clock_in(
        &self,
        user_id: &str,
        work_date: &str,
        punch: &Punch,
    ) -> Result<DayInsert> {
        let active = attendance::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            work_date: Set(work_date.to_string()),
            clock_in: Set(Some(punch.at.clone())),
            clock_out: Set(None),
            clock_in_photo: Set(Some(punch.photo_url.clone())),
            clock_out_photo: Set(None),
            clock_in_location: Set(Some(punch.location.clone())),
            clock_out_location: Set(None),
            is_verified: Set(true),
            created_at: Set(punch.at.clone()),
            updated_at: Set(punch.at.clone()),
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(DayInsert::Inserted(AttendanceRecord::from(model))),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(DayInsert::AlreadyExists)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to insert attendance")),
        }
    }

    /// Overwrites the clock-in side of the day's record. Returns `None` if the row vanished.
    pub async fn update_clock_in(
        &self,
        user_id: &str,
        work_date: &str,
        punch: &Punch,
    ) -> Result<Option<AttendanceRecord>> {
        let Some(model) = self.find_model(user_id, work_date).await? else {
            return Ok(None);
        };

        let mut active: attendance::ActiveModel = model.into();
        active.clock_in = Set(Some(punch.at.clone()));
        active.clock_in_photo = Set(Some(punch.photo_url.clone()));
        active.clock_in_location = Set(Some(punch.location.clone()));
        active.is_verified = Set(true);
        active.updated_at = Set(punch.at.clone());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update clock-in")?;
        Ok(Some(AttendanceRecord::from(model)))
    }

    pub async fn update_clock_out(
        &self,
        user_id: &str,
        work_date: &str,
        punch: &Punch,
    ) -> Result<Option<AttendanceRecord>> {
        let Some(model) = self.find_model(user_id, work_date).await? else {
            return Ok(None);
        };

        let mut active: attendance::ActiveModel = model.into();
        active.clock_out = Set(Some(punch.at.clone()));
        active.clock_out_photo = Set(Some(punch.photo_url.clone()));
        active.clock_out_location = Set(Some(punch.location.clone()));
        active.updated_at = Set(punch.at.clone());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update clock-out")?;
        Ok(Some(AttendanceRecord::from(model)))
    }

    /// Records created within `[start, end]`, newest first. Bounds use the stored timestamp format.
    pub async fn history(
        &self,
        user_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<AttendanceRecord>> {
        let rows = Attendance::find()
            .filter(attendance::Column::UserId.eq(user_id))
            .filter(attendance::Column::CreatedAt.gte(start))
            .filter(attendance::Column::CreatedAt.lte(end))
            .order_by_desc(attendance::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query attendance history")?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }
}
