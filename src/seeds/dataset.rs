//! Baseline records every EventHive store starts with.
//!
//! Identities are explicit so that re-running the seed hits the primary key
//! and is classified as already seeded.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};

use crate::models::organizer_profile::VerificationStatus;
use crate::models::user::UserRole;
use crate::models::{event, organizer_profile, ticket, user};

/// Placeholder bcrypt-shaped hash shared by all seeded accounts. It matches
/// no password, so seeded accounts cannot log in until a reset.
pub const PLACEHOLDER_PASSWORD_HASH: &str =
    "$2b$10$eventhive.seed.placeholder.hash.not.a.real.password.";

/// Organizer that owns every seeded event.
pub const SEED_ORGANIZER_ID: i32 = 2;

/// Creation time stamped on every seeded row.
const SEEDED_AT: (i32, u32, u32, u32) = (2026, 10, 1, 0);

/// One literal row of the seed dataset.
#[derive(Debug, Clone)]
pub struct SeedRecord {
    /// Table the record belongs to.
    pub entity: &'static str,
    pub id: i32,
    row: SeedRow,
}

#[derive(Debug, Clone)]
enum SeedRow {
    User(user::ActiveModel),
    OrganizerProfile(organizer_profile::ActiveModel),
    Event(event::ActiveModel),
    Ticket(ticket::ActiveModel),
}

impl SeedRecord {
    /// Key used when reporting on this record.
    pub fn key(&self) -> String {
        format!("id={}", self.id)
    }

    /// Inserts the record as-is, without reading the row back.
    pub async fn insert<C: ConnectionTrait>(&self, db: &C) -> Result<(), DbErr> {
        match &self.row {
            SeedRow::User(model) => {
                user::Entity::insert(model.clone())
                    .exec_without_returning(db)
                    .await?;
            }
            SeedRow::OrganizerProfile(model) => {
                organizer_profile::Entity::insert(model.clone())
                    .exec_without_returning(db)
                    .await?;
            }
            SeedRow::Event(model) => {
                event::Entity::insert(model.clone())
                    .exec_without_returning(db)
                    .await?;
            }
            SeedRow::Ticket(model) => {
                ticket::Entity::insert(model.clone())
                    .exec_without_returning(db)
                    .await?;
            }
        }
        Ok(())
    }
}

/// The full seed dataset. Every timestamp is a literal, so two stores seeded
/// at different times hold identical rows.
pub fn dataset() -> Vec<SeedRecord> {
    let seeded_at = utc(SEEDED_AT);
    let mut records = vec![
        seed_user(
            1,
            "admin",
            "admin@eventhive.com",
            "EventHive Admin",
            UserRole::Admin,
            seeded_at,
        ),
        seed_user(
            2,
            "john_organizer",
            "john@eventhive.com",
            "John Organizer",
            UserRole::Organizer,
            seeded_at,
        ),
        seed_user(
            3,
            "jane_user",
            "jane@eventhive.com",
            "Jane User",
            UserRole::User,
            seeded_at,
        ),
        SeedRecord {
            entity: "organizer_profiles",
            id: 1,
            row: SeedRow::OrganizerProfile(organizer_profile::ActiveModel {
                id: Set(1),
                user_id: Set(SEED_ORGANIZER_ID),
                company_name: Set("EventHive Productions".to_string()),
                bio: Set(Some("Live music, tech and food events across Nigeria.".to_string())),
                website: Set(Some("https://eventhive.com".to_string())),
                verification_status: Set(VerificationStatus::Verified),
                rating: Set(Decimal::new(450, 2)),
                total_events: Set(3),
                total_tickets_sold: Set(0),
                created_at: Set(seeded_at),
                updated_at: Set(seeded_at),
            }),
        },
    ];

    // (id, name, category, location, starts, ends, registration closes, coordinates)
    let events = [
        (
            1,
            "Lagos Tech Summit 2026",
            "technology",
            "Landmark Centre, Lagos",
            (2026, 11, 20, 9),
            (2026, 11, 20, 17),
            (2026, 11, 19, 9),
            (642811000, 340123000),
        ),
        (
            2,
            "Afrobeats Live",
            "music",
            "Eko Convention Center, Lagos",
            (2026, 12, 5, 18),
            (2026, 12, 5, 23),
            (2026, 12, 4, 18),
            (642500000, 342100000),
        ),
        (
            3,
            "Abuja Food Festival",
            "food",
            "Millennium Park, Abuja",
            (2026, 12, 19, 10),
            (2026, 12, 19, 20),
            (2026, 12, 18, 10),
            (906720000, 749880000),
        ),
    ];
    for (id, name, category, location, starts, ends, closes, (latitude, longitude)) in events {
        records.push(SeedRecord {
            entity: "events",
            id,
            row: SeedRow::Event(event::ActiveModel {
                id: Set(id),
                organizer_id: Set(SEED_ORGANIZER_ID),
                name: Set(name.to_string()),
                description: Set(Some(format!("{} hosted by EventHive Productions.", name))),
                category: Set(category.to_string()),
                start_date: Set(utc(starts)),
                end_date: Set(utc(ends)),
                registration_start: Set(Some(seeded_at)),
                registration_end: Set(Some(utc(closes))),
                location: Set(location.to_string()),
                latitude: Set(Some(Decimal::new(latitude, 8))),
                longitude: Set(Some(Decimal::new(longitude, 8))),
                image_url: Set(None),
                is_published: Set(true),
                created_at: Set(seeded_at),
                updated_at: Set(seeded_at),
            }),
        });
    }

    let tickets = [
        (1, 1, "Regular", Decimal::new(1500000, 2), 500),
        (2, 1, "VIP", Decimal::new(5000000, 2), 100),
        (3, 2, "Regular", Decimal::new(1000000, 2), 2000),
        (4, 2, "VIP", Decimal::new(3500000, 2), 200),
        (5, 3, "General Admission", Decimal::new(500000, 2), 1000),
    ];
    for (id, event_id, ticket_type, price, max_total) in tickets {
        records.push(SeedRecord {
            entity: "tickets",
            id,
            row: SeedRow::Ticket(ticket::ActiveModel {
                id: Set(id),
                event_id: Set(event_id),
                ticket_type: Set(ticket_type.to_string()),
                description: Set(None),
                price: Set(price),
                max_per_user: Set(10),
                max_total: Set(max_total),
                sold_count: Set(0),
                sale_start: Set(Some(seeded_at)),
                sale_end: Set(None),
                is_active: Set(true),
                created_at: Set(seeded_at),
                updated_at: Set(seeded_at),
            }),
        });
    }

    records
}

/// `(year, month, day, hour)` in UTC. Out-of-range parts fall back to the
/// Unix epoch, which the dataset tests reject.
fn utc((year, month, day, hour): (i32, u32, u32, u32)) -> DateTimeWithTimeZone {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .unwrap_or_default()
}

fn seed_user(
    id: i32,
    username: &str,
    email: &str,
    full_name: &str,
    role: UserRole,
    seeded_at: DateTimeWithTimeZone,
) -> SeedRecord {
    SeedRecord {
        entity: "users",
        id,
        row: SeedRow::User(user::ActiveModel {
            id: Set(id),
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            phone: Set(None),
            password_hash: Set(PLACEHOLDER_PASSWORD_HASH.to_string()),
            full_name: Set(Some(full_name.to_string())),
            role: Set(role),
            is_verified: Set(true),
            created_at: Set(seeded_at),
            updated_at: Set(seeded_at),
        }),
    }
}
