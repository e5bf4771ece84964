//! Declarative definitions of every EventHive entity.
//!
//! The catalog is the single source of truth for table structure: the
//! resolver derives creation order from it and the materializer renders DDL
//! from it. Every entity implicitly carries an auto-increment `id` primary key
//! and `created_at` / `updated_at` timestamps.
//!
//! Inventory counters (`tickets.sold_count` against `tickets.max_total`,
//! `promotions.used_count` against `promotions.usage_limit`) and the
//! registration window of events are plain columns here. Writers must enforce
//! those bounds transactionally.

/// Name of the surrogate primary key carried by every entity.
pub const ID_COLUMN: &str = "id";

pub const USER_ROLES: &[&str] = &["user", "organizer", "admin"];
pub const VERIFICATION_STATUSES: &[&str] = &["pending", "verified", "rejected"];
pub const PAYMENT_STATUSES: &[&str] = &["pending", "completed", "failed", "refunded"];
pub const DISCOUNT_TYPES: &[&str] = &["percentage", "fixed", "early_bird"];

/// Semantic column kinds understood by the materializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    /// Bounded string (`VARCHAR(n)`).
    String(u32),
    Text,
    /// Fixed-point number with (precision, scale).
    Decimal(u32, u32),
    Boolean,
    Timestamp,
    /// String restricted to a fixed value set through a check constraint.
    Enumerated(&'static [&'static str]),
    /// Opaque structured blob.
    Json,
}

/// Column default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Int(i64),
    Bool(bool),
    Str(&'static str),
    CurrentTimestamp,
}

/// Check constraints a column may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    AtLeast(i64),
    Between(i64, i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    pub default: Option<FieldDefault>,
    pub check: Option<Check>,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            default: None,
            check: None,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub const fn with_default(self, value: FieldDefault) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    pub const fn with_check(self, check: Check) -> Self {
        Self {
            check: Some(check),
            ..self
        }
    }
}

const fn field(name: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef::new(name, kind)
}

/// What happens to referencing rows when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
}

/// A foreign key from `column` to the `id` of the `references` entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub column: &'static str,
    pub references: &'static str,
    pub on_delete: OnDelete,
}

/// A single- or multi-column uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueDef {
    pub columns: &'static [&'static str],
}

impl UniqueDef {
    /// Index name used to materialize the constraint, e.g. `uq_users_email`.
    pub fn index_name(&self, table: &str) -> String {
        format!("uq_{}_{}", table, self.columns.join("_"))
    }
}

/// A named, non-unique secondary lookup index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Definition of one entity (one table in the store).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDef {
    /// Table name; also the identity of the entity throughout the pipeline.
    pub name: &'static str,
    /// Human-readable entity name.
    pub label: &'static str,
    pub fields: &'static [FieldDef],
    pub unique: &'static [UniqueDef],
    pub foreign_keys: &'static [ForeignKeyDef],
    pub indexes: &'static [IndexDef],
    /// Entities whose seed rows must exist before this entity is seeded,
    /// ordered exactly like foreign keys.
    pub seed_after: &'static [&'static str],
}

const TIMESTAMPS: [FieldDef; 2] = [
    field("created_at", FieldKind::Timestamp).with_default(FieldDefault::CurrentTimestamp),
    field("updated_at", FieldKind::Timestamp).with_default(FieldDefault::CurrentTimestamp),
];

impl EntityDef {
    /// Every column in table order, excluding the `id` primary key.
    pub fn columns(&self) -> Vec<FieldDef> {
        self.fields
            .iter()
            .copied()
            .chain(TIMESTAMPS)
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Entities that must exist before this one. Self-references are skipped.
    pub fn dependencies(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references)
            .chain(self.seed_after.iter().copied())
            .filter(move |target| *target != self.name)
    }
}

/// Looks up an entity definition by table name.
pub fn find<'a>(catalog: &'a [EntityDef], name: &str) -> Option<&'a EntityDef> {
    catalog.iter().find(|e| e.name == name)
}

/// The EventHive schema.
pub static CATALOG: &[EntityDef] = &[
    EntityDef {
        name: "users",
        label: "User",
        fields: &[
            field("username", FieldKind::String(50)),
            field("email", FieldKind::String(100)),
            field("phone", FieldKind::String(20)).nullable(),
            field("password_hash", FieldKind::String(255)),
            field("full_name", FieldKind::String(100)).nullable(),
            field("role", FieldKind::Enumerated(USER_ROLES)).with_default(FieldDefault::Str("user")),
            field("is_verified", FieldKind::Boolean).with_default(FieldDefault::Bool(false)),
        ],
        unique: &[
            UniqueDef { columns: &["username"] },
            UniqueDef { columns: &["email"] },
            UniqueDef { columns: &["phone"] },
        ],
        foreign_keys: &[],
        indexes: &[IndexDef { name: "idx_users_role", columns: &["role"] }],
        seed_after: &[],
    },
    EntityDef {
        name: "organizer_profiles",
        label: "OrganizerProfile",
        fields: &[
            field("user_id", FieldKind::Integer),
            field("company_name", FieldKind::String(100)),
            field("bio", FieldKind::Text).nullable(),
            field("website", FieldKind::String(255)).nullable(),
            field("verification_status", FieldKind::Enumerated(VERIFICATION_STATUSES))
                .with_default(FieldDefault::Str("pending")),
            // Expected within [0, 5]; not constrained.
            field("rating", FieldKind::Decimal(3, 2)).with_default(FieldDefault::Int(0)),
            field("total_events", FieldKind::Integer).with_default(FieldDefault::Int(0)),
            field("total_tickets_sold", FieldKind::Integer).with_default(FieldDefault::Int(0)),
        ],
        unique: &[UniqueDef { columns: &["user_id"] }],
        foreign_keys: &[ForeignKeyDef {
            column: "user_id",
            references: "users",
            on_delete: OnDelete::Cascade,
        }],
        indexes: &[],
        seed_after: &[],
    },
    EntityDef {
        name: "events",
        label: "Event",
        fields: &[
            field("organizer_id", FieldKind::Integer),
            field("name", FieldKind::String(200)),
            field("description", FieldKind::Text).nullable(),
            field("category", FieldKind::String(50)),
            field("start_date", FieldKind::Timestamp),
            field("end_date", FieldKind::Timestamp),
            field("registration_start", FieldKind::Timestamp).nullable(),
            field("registration_end", FieldKind::Timestamp).nullable(),
            field("location", FieldKind::String(255)),
            field("latitude", FieldKind::Decimal(10, 8)).nullable(),
            field("longitude", FieldKind::Decimal(11, 8)).nullable(),
            field("image_url", FieldKind::String(255)).nullable(),
            field("is_published", FieldKind::Boolean).with_default(FieldDefault::Bool(false)),
        ],
        unique: &[],
        foreign_keys: &[ForeignKeyDef {
            column: "organizer_id",
            references: "users",
            on_delete: OnDelete::Cascade,
        }],
        indexes: &[
            IndexDef { name: "idx_events_organizer", columns: &["organizer_id"] },
            IndexDef { name: "idx_events_category", columns: &["category"] },
            IndexDef { name: "idx_events_start_date", columns: &["start_date"] },
        ],
        // Seeded events belong to an organizer that already has a profile.
        seed_after: &["organizer_profiles"],
    },
    EntityDef {
        name: "tickets",
        label: "Ticket",
        fields: &[
            field("event_id", FieldKind::Integer),
            field("ticket_type", FieldKind::String(50)),
            field("description", FieldKind::Text).nullable(),
            field("price", FieldKind::Decimal(10, 2))
                .with_default(FieldDefault::Int(0))
                .with_check(Check::AtLeast(0)),
            field("max_per_user", FieldKind::Integer).with_default(FieldDefault::Int(10)),
            field("max_total", FieldKind::Integer),
            field("sold_count", FieldKind::Integer).with_default(FieldDefault::Int(0)),
            field("sale_start", FieldKind::Timestamp).nullable(),
            field("sale_end", FieldKind::Timestamp).nullable(),
            field("is_active", FieldKind::Boolean).with_default(FieldDefault::Bool(true)),
        ],
        unique: &[],
        foreign_keys: &[ForeignKeyDef {
            column: "event_id",
            references: "events",
            on_delete: OnDelete::Cascade,
        }],
        indexes: &[IndexDef { name: "idx_tickets_event", columns: &["event_id"] }],
        seed_after: &[],
    },
    EntityDef {
        name: "transactions",
        label: "Transaction",
        fields: &[
            field("booking_id", FieldKind::String(50)),
            field("user_id", FieldKind::Integer),
            field("event_id", FieldKind::Integer),
            field("ticket_id", FieldKind::Integer),
            field("quantity", FieldKind::Integer),
            field("total_amount", FieldKind::Decimal(10, 2)),
            field("payment_status", FieldKind::Enumerated(PAYMENT_STATUSES))
                .with_default(FieldDefault::Str("pending")),
            field("payment_method", FieldKind::String(50)).nullable(),
            field("payment_reference", FieldKind::String(100)).nullable(),
        ],
        unique: &[UniqueDef { columns: &["booking_id"] }],
        foreign_keys: &[
            ForeignKeyDef {
                column: "user_id",
                references: "users",
                on_delete: OnDelete::Cascade,
            },
            ForeignKeyDef {
                column: "event_id",
                references: "events",
                on_delete: OnDelete::Cascade,
            },
            ForeignKeyDef {
                column: "ticket_id",
                references: "tickets",
                on_delete: OnDelete::Cascade,
            },
        ],
        indexes: &[
            IndexDef { name: "idx_transactions_user", columns: &["user_id"] },
            IndexDef { name: "idx_transactions_event", columns: &["event_id"] },
            IndexDef {
                name: "idx_transactions_payment_status",
                columns: &["payment_status"],
            },
        ],
        seed_after: &[],
    },
    EntityDef {
        name: "attendees",
        label: "Attendee",
        fields: &[
            field("transaction_id", FieldKind::Integer),
            field("name", FieldKind::String(100)),
            field("email", FieldKind::String(100)),
            field("qr_code", FieldKind::String(255)),
            field("has_attended", FieldKind::Boolean).with_default(FieldDefault::Bool(false)),
            field("check_in_time", FieldKind::Timestamp).nullable(),
        ],
        unique: &[UniqueDef { columns: &["qr_code"] }],
        foreign_keys: &[ForeignKeyDef {
            column: "transaction_id",
            references: "transactions",
            on_delete: OnDelete::Cascade,
        }],
        indexes: &[IndexDef {
            name: "idx_attendees_transaction",
            columns: &["transaction_id"],
        }],
        seed_after: &[],
    },
    EntityDef {
        name: "promotions",
        label: "Promotion",
        fields: &[
            field("event_id", FieldKind::Integer),
            field("code", FieldKind::String(50)),
            field("description", FieldKind::Text).nullable(),
            field("discount_type", FieldKind::Enumerated(DISCOUNT_TYPES)),
            field("discount_value", FieldKind::Decimal(10, 2)),
            field("usage_limit", FieldKind::Integer).nullable(),
            field("used_count", FieldKind::Integer).with_default(FieldDefault::Int(0)),
            field("valid_from", FieldKind::Timestamp).nullable(),
            field("valid_until", FieldKind::Timestamp).nullable(),
            field("is_active", FieldKind::Boolean).with_default(FieldDefault::Bool(true)),
        ],
        unique: &[UniqueDef { columns: &["code"] }],
        foreign_keys: &[ForeignKeyDef {
            column: "event_id",
            references: "events",
            on_delete: OnDelete::Cascade,
        }],
        indexes: &[IndexDef { name: "idx_promotions_event", columns: &["event_id"] }],
        seed_after: &[],
    },
    EntityDef {
        name: "user_sessions",
        label: "UserSession",
        fields: &[
            field("user_id", FieldKind::Integer),
            field("session_token", FieldKind::String(255)),
            field("device_info", FieldKind::Text).nullable(),
            field("ip_address", FieldKind::String(45)).nullable(),
            field("expires_at", FieldKind::Timestamp),
            field("is_active", FieldKind::Boolean).with_default(FieldDefault::Bool(true)),
        ],
        unique: &[UniqueDef { columns: &["session_token"] }],
        foreign_keys: &[ForeignKeyDef {
            column: "user_id",
            references: "users",
            on_delete: OnDelete::Cascade,
        }],
        indexes: &[
            IndexDef { name: "idx_user_sessions_user", columns: &["user_id"] },
            IndexDef { name: "idx_user_sessions_expires_at", columns: &["expires_at"] },
        ],
        seed_after: &[],
    },
    EntityDef {
        name: "event_reviews",
        label: "EventReview",
        fields: &[
            field("event_id", FieldKind::Integer),
            field("user_id", FieldKind::Integer),
            field("transaction_id", FieldKind::Integer).nullable(),
            field("rating", FieldKind::Integer).with_check(Check::Between(1, 5)),
            field("review_text", FieldKind::Text).nullable(),
            field("is_verified_attendee", FieldKind::Boolean).with_default(FieldDefault::Bool(false)),
        ],
        unique: &[UniqueDef { columns: &["event_id", "user_id"] }],
        foreign_keys: &[
            ForeignKeyDef {
                column: "event_id",
                references: "events",
                on_delete: OnDelete::Cascade,
            },
            ForeignKeyDef {
                column: "user_id",
                references: "users",
                on_delete: OnDelete::Cascade,
            },
            ForeignKeyDef {
                column: "transaction_id",
                references: "transactions",
                on_delete: OnDelete::SetNull,
            },
        ],
        indexes: &[IndexDef { name: "idx_event_reviews_event", columns: &["event_id"] }],
        seed_after: &[],
    },
    EntityDef {
        name: "event_templates",
        label: "EventTemplate",
        fields: &[
            field("organizer_id", FieldKind::Integer),
            field("name", FieldKind::String(100)),
            field("description", FieldKind::Text).nullable(),
            field("category", FieldKind::String(50)).nullable(),
            // Minutes.
            field("default_duration", FieldKind::Integer).nullable(),
            field("default_location", FieldKind::String(255)).nullable(),
            field("default_ticket_types", FieldKind::Json).nullable(),
            field("default_settings", FieldKind::Json).nullable(),
            field("usage_count", FieldKind::Integer).with_default(FieldDefault::Int(0)),
        ],
        unique: &[],
        foreign_keys: &[ForeignKeyDef {
            column: "organizer_id",
            references: "users",
            on_delete: OnDelete::Cascade,
        }],
        indexes: &[IndexDef {
            name: "idx_event_templates_organizer",
            columns: &["organizer_id"],
        }],
        seed_after: &[],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_defines_ten_distinct_entities() {
        assert_eq!(CATALOG.len(), 10);
        let names: HashSet<_> = CATALOG.iter().map(|e| e.name).collect();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn every_reference_targets_a_catalog_entity() {
        for entity in CATALOG {
            for target in entity.dependencies() {
                assert!(
                    find(CATALOG, target).is_some(),
                    "{} references unknown entity {}",
                    entity.name,
                    target
                );
            }
        }
    }

    #[test]
    fn constraint_columns_are_declared_fields() {
        for entity in CATALOG {
            let columns = entity
                .unique
                .iter()
                .flat_map(|u| u.columns.iter())
                .chain(entity.indexes.iter().flat_map(|i| i.columns.iter()))
                .chain(entity.foreign_keys.iter().map(|fk| &fk.column));
            for column in columns {
                assert!(
                    entity.field(column).is_some(),
                    "{}.{} is not a declared field",
                    entity.name,
                    column
                );
            }
        }
    }

    #[test]
    fn set_null_references_are_nullable() {
        for entity in CATALOG {
            for fk in entity.foreign_keys {
                if fk.on_delete == OnDelete::SetNull {
                    assert!(entity.field(fk.column).is_some_and(|f| f.nullable));
                }
            }
        }
    }

    #[test]
    fn enumerated_defaults_are_members_of_their_set() {
        for entity in CATALOG {
            for f in entity.fields {
                if let (FieldKind::Enumerated(values), Some(FieldDefault::Str(default))) =
                    (f.kind, f.default)
                {
                    assert!(values.contains(&default), "{}.{}", entity.name, f.name);
                }
            }
        }
    }

    #[test]
    fn columns_append_timestamps() {
        let users = find(CATALOG, "users").unwrap();
        let columns: Vec<_> = users.columns().iter().map(|c| c.name).collect();
        assert_eq!(columns.first(), Some(&"username"));
        assert_eq!(&columns[columns.len() - 2..], &["created_at", "updated_at"]);
    }

    #[test]
    fn review_uniqueness_spans_event_and_user() {
        let reviews = find(CATALOG, "event_reviews").unwrap();
        assert_eq!(reviews.unique[0].columns, &["event_id", "user_id"]);
        assert_eq!(
            reviews.unique[0].index_name(reviews.name),
            "uq_event_reviews_event_id_user_id"
        );
    }
}
