//! OrganizerProfile entity model
//!
//! One-to-one extension of an organizer's user account.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizer_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,

    pub company_name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    pub website: Option<String>,

    pub verification_status: VerificationStatus,

    /// Average rating, expected within [0, 5].
    #[sea_orm(column_type = "Decimal(Some((3, 2)))")]
    pub rating: Decimal,

    pub total_events: i32,

    pub total_tickets_sold: i32,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Default)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum VerificationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,

    #[sea_orm(string_value = "verified")]
    Verified,

    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
