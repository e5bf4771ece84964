//! EventTemplate entity model
//!
//! Reusable defaults an organizer can start new events from.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "event_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub organizer_id: i32,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub category: Option<String>,

    /// Default duration in minutes.
    pub default_duration: Option<i32>,

    pub default_location: Option<String>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub default_ticket_types: Option<Json>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub default_settings: Option<Json>,

    pub usage_count: i32,

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
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
