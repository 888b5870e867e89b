use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub employee_id: String,

    pub name: String,

    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub position: Option<String>,

    pub profile_photo_url: Option<String>,

    pub company_id: Option<String>,

    pub company_name: Option<String>,

    pub face_embedding_id: Option<String>,

    pub created_at: String,

    pub updated_at: String,

    /// Soft-delete marker. Users are never removed from the table.
    pub deleted_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
    #[sea_orm(has_one = "super::face_embeddings::Entity")]
    FaceEmbeddings,
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl Related<super::face_embeddings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FaceEmbeddings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
