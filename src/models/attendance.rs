use serde::{Deserialize, Serialize};

use crate::entities::attendance;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attendance {
    pub id: String,
    pub user_id: String,
    pub work_date: String,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub clock_in_photo: Option<String>,
    pub clock_out_photo: Option<String>,
    pub clock_in_location: Option<String>,
    pub clock_out_location: Option<String>,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<attendance::Model> for Attendance {
    fn from(model: attendance::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            work_date: model.work_date,
            clock_in: model.clock_in,
            clock_out: model.clock_out,
            clock_in_photo: model.clock_in_photo,
            clock_out_photo: model.clock_out_photo,
            clock_in_location: model.clock_in_location,
            clock_out_location: model.clock_out_location,
            is_verified: model.is_verified,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// One side (in or out) of a punch: when, with which stored photo, and where.
#[derive(Debug, Clone)]
pub struct Punch {
    pub at: String,
    pub photo_url: String,
    pub location: String,
}
