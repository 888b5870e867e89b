use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    /// Calendar day (`YYYY-MM-DD`) the record belongs to. Unique together with `user_id`.
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
