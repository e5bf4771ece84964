//! Promotion entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "promotions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub event_id: i32,

    #[sea_orm(unique)]
    pub code: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub discount_type: DiscountType,

    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub discount_value: Decimal,

    /// `None` means unlimited.
    pub usage_limit: Option<i32>,

    /// Must never exceed `usage_limit`; not constrained by the store.
    pub used_count: i32,

    pub valid_from: Option<DateTimeWithTimeZone>,

    pub valid_until: Option<DateTimeWithTimeZone>,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum DiscountType {
    #[sea_orm(string_value = "percentage")]
    Percentage,

    #[sea_orm(string_value = "fixed")]
    Fixed,

    #[sea_orm(string_value = "early_bird")]
    EarlyBird,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
