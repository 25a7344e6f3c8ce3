//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::Role;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub reset_password_token: Option<String>,
    pub reset_password_expires: Option<DateTimeWithTimeZone>,
    pub avatar: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub joined_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for quill_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            role: Role::parse(&model.role).unwrap_or(Role::User),
            is_verified: model.is_verified,
            verification_token: model.verification_token,
            reset_password_token: model.reset_password_token,
            reset_password_expires: model.reset_password_expires.map(Into::into),
            avatar: model.avatar,
            bio: model.bio,
            joined_at: model.joined_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<quill_core::domain::User> for ActiveModel {
    fn from(user: quill_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role.as_str().to_string()),
            is_verified: Set(user.is_verified),
            verification_token: Set(user.verification_token),
            reset_password_token: Set(user.reset_password_token),
            reset_password_expires: Set(user.reset_password_expires.map(Into::into)),
            avatar: Set(user.avatar),
            bio: Set(user.bio),
            joined_at: Set(user.joined_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
