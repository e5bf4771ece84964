//! Event entity model
//!
//! Events are owned by an organizer account. `registration_end` is expected
//! to fall before `start_date`; nothing in the store enforces it.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub organizer_id: i32,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub category: String,

    pub start_date: DateTimeWithTimeZone,

    pub end_date: DateTimeWithTimeZone,

    pub registration_start: Option<DateTimeWithTimeZone>,

    pub registration_end: Option<DateTimeWithTimeZone>,

    pub location: String,

    #[sea_orm(column_type = "Decimal(Some((10, 8)))", nullable)]
    pub latitude: Option<Decimal>,

    #[sea_orm(column_type = "Decimal(Some((11, 8)))", nullable)]
    pub longitude: Option<Decimal>,

    pub image_url: Option<String>,

    pub is_published: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OrganizerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Organizer,

    #[sea_orm(has_many = "super::ticket::Entity")]
    Ticket,

    #[sea_orm(has_many = "super::promotion::Entity")]
    Promotion,

    #[sea_orm(has_many = "super::event_review::Entity")]
    EventReview,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl Related<super::promotion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Promotion.def()
    }
}

impl Related<super::event_review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventReview.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
