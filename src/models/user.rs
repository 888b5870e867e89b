use serde::{Deserialize, Serialize};

use crate::entities::users;

/// A user profile as exposed to clients. The password hash never leaves the repository layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub profile_photo_url: Option<String>,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
    pub face_embedding_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_id,
            name: model.name,
            email: model.email,
            position: model.position,
            profile_photo_url: model.profile_photo_url,
            company_id: model.company_id,
            company_name: model.company_name,
            face_embedding_id: model.face_embedding_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
}
