//! User entity model
//!
//! Accounts for attendees, organizers and administrators. Username, email
//! and phone are each globally unique.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(unique)]
    pub phone: Option<String>,

    /// Opaque hash; hashing happens outside this crate.
    pub password_hash: String,

    pub full_name: Option<String>,

    pub role: UserRole,

    pub is_verified: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Default)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum UserRole {
    #[sea_orm(string_value = "user")]
    #[default]
    User,

    #[sea_orm(string_value = "organizer")]
    Organizer,

    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::organizer_profile::Entity")]
    OrganizerProfile,

    #[sea_orm(has_many = "super::event::Entity")]
    Event,

    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,

    #[sea_orm(has_many = "super::user_session::Entity")]
    UserSession,
}

impl Related<super::organizer_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizerProfile.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::user_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
