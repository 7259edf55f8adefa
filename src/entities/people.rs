use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "people")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub full_name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// One of UNDEFINED, ADMIN, TEACHER, STUDENT
    pub role: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Bearer token issued on the last successful login
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    #[sea_orm(nullable)]
    pub reset_token: Option<String>,

    #[sea_orm(nullable)]
    pub reset_expires_at: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
