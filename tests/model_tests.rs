//! Typed entity models read and write the provisioned schema.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use eventhive::migration::catalog::CATALOG;
use eventhive::migration::resolver::resolve_order;
use eventhive::models::organizer_profile::VerificationStatus;
use eventhive::models::promotion::DiscountType;
use eventhive::models::transaction::PaymentStatus;
use eventhive::models::user::UserRole;
use eventhive::models::{
    Attendee, Event, EventReview, EventTemplate, OrganizerProfile, Promotion, Ticket, Transaction,
    User, UserSession, attendee, event_review, event_template, promotion, transaction, user,
    user_session,
};
use eventhive::seeds::{dataset, seed_all};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder, Set};
use serde_json::json;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::setup_test_db;

fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

/// Seeds the baseline dataset, then writes one row into each of the six
/// tables the dataset leaves empty.
async fn populated_db() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    seed_all(&db, &resolve_order(CATALOG)?, &dataset()).await?;
    let stamp = at("2026-10-17T12:00:00+00:00");

    transaction::ActiveModel {
        id: Set(1),
        booking_id: Set("BK-0001".to_string()),
        user_id: Set(3),
        event_id: Set(1),
        ticket_id: Set(1),
        quantity: Set(2),
        total_amount: Set(Decimal::new(7550, 2)),
        payment_status: Set(PaymentStatus::Completed),
        payment_method: Set(Some("card".to_string())),
        payment_reference: Set(None),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
    .insert(&db)
    .await?;

    attendee::ActiveModel {
        id: Set(1),
        transaction_id: Set(1),
        name: Set("Jane User".to_string()),
        email: Set("jane@eventhive.com".to_string()),
        qr_code: Set("QR-0001".to_string()),
        has_attended: Set(false),
        check_in_time: Set(None),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
    .insert(&db)
    .await?;

    promotion::ActiveModel {
        id: Set(1),
        event_id: Set(1),
        code: Set("EARLY20".to_string()),
        description: Set(None),
        discount_type: Set(DiscountType::EarlyBird),
        discount_value: Set(Decimal::new(2000, 2)),
        usage_limit: Set(Some(100)),
        used_count: Set(0),
        valid_from: Set(Some(stamp)),
        valid_until: Set(Some(at("2026-11-01T00:00:00+00:00"))),
        is_active: Set(true),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
    .insert(&db)
    .await?;

    user_session::ActiveModel {
        id: Set(1),
        user_id: Set(3),
        session_token: Set("session-token-0001".to_string()),
        device_info: Set(Some("Firefox on Linux".to_string())),
        ip_address: Set(Some("10.0.0.7".to_string())),
        expires_at: Set(at("2026-10-18T12:00:00+00:00")),
        is_active: Set(true),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
    .insert(&db)
    .await?;

    event_review::ActiveModel {
        id: Set(1),
        event_id: Set(1),
        user_id: Set(3),
        transaction_id: Set(Some(1)),
        rating: Set(5),
        review_text: Set(Some("Great talks.".to_string())),
        is_verified_attendee: Set(true),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
    .insert(&db)
    .await?;

    event_template::ActiveModel {
        id: Set(1),
        organizer_id: Set(2),
        name: Set("Conference day".to_string()),
        description: Set(None),
        category: Set(Some("technology".to_string())),
        default_duration: Set(Some(480)),
        default_location: Set(None),
        default_ticket_types: Set(Some(json!([
            {"ticket_type": "Regular", "price": "15000.00"},
            {"ticket_type": "VIP", "price": "50000.00"}
        ]))),
        default_settings: Set(Some(json!({"is_published": false}))),
        usage_count: Set(0),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
    .insert(&db)
    .await?;

    Ok(db)
}

#[tokio::test]
async fn seeded_entities_load_through_their_models() -> Result<()> {
    let db = populated_db().await?;

    let users = User::find()
        .order_by_asc(user::Column::Id)
        .all(&db)
        .await?;
    assert_eq!(users.len(), 3);
    assert_eq!(users[0].role, UserRole::Admin);
    assert_eq!(users[2].phone, None);

    let profiles = OrganizerProfile::find().all(&db).await?;
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].verification_status, VerificationStatus::Verified);
    assert_eq!(profiles[0].rating, Decimal::new(450, 2));

    let events = Event::find().all(&db).await?;
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.latitude.is_some() && e.longitude.is_some()));

    let tickets = Ticket::find().all(&db).await?;
    assert_eq!(tickets.len(), 5);
    assert!(tickets.iter().any(|t| t.price == Decimal::new(1500000, 2)));
    Ok(())
}

#[tokio::test]
async fn booking_entities_round_trip_through_their_models() -> Result<()> {
    let db = populated_db().await?;

    let transactions = Transaction::find().all(&db).await?;
    assert_eq!(transactions.len(), 1);
    let booking = &transactions[0];
    assert_eq!(booking.payment_status, PaymentStatus::Completed);
    assert_eq!(booking.total_amount, Decimal::new(7550, 2));
    assert_eq!(booking.payment_method.as_deref(), Some("card"));
    assert_eq!(booking.payment_reference, None);
    assert_eq!(booking.created_at, at("2026-10-17T12:00:00+00:00"));

    let attendees = booking.find_related(Attendee).all(&db).await?;
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0].qr_code, "QR-0001");
    assert!(!attendees[0].has_attended);
    assert_eq!(attendees[0].check_in_time, None);

    let reviews = EventReview::find().all(&db).await?;
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].transaction_id, Some(1));
    assert_eq!(reviews[0].rating, 5);
    Ok(())
}

#[tokio::test]
async fn marketing_and_session_entities_round_trip_through_their_models() -> Result<()> {
    let db = populated_db().await?;

    let promotions = Promotion::find().all(&db).await?;
    assert_eq!(promotions.len(), 1);
    assert_eq!(promotions[0].discount_type, DiscountType::EarlyBird);
    assert_eq!(promotions[0].discount_value, Decimal::new(2000, 2));
    assert_eq!(promotions[0].usage_limit, Some(100));
    assert_eq!(promotions[0].description, None);
    assert_eq!(
        promotions[0].valid_until,
        Some(at("2026-11-01T00:00:00+00:00"))
    );

    let sessions = UserSession::find().all(&db).await?;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_token, "session-token-0001");
    assert_eq!(sessions[0].expires_at, at("2026-10-18T12:00:00+00:00"));

    let templates = EventTemplate::find().all(&db).await?;
    assert_eq!(templates.len(), 1);
    let template = &templates[0];
    assert_eq!(template.default_duration, Some(480));
    assert_eq!(template.default_location, None);
    assert_eq!(
        template.default_ticket_types,
        Some(json!([
            {"ticket_type": "Regular", "price": "15000.00"},
            {"ticket_type": "VIP", "price": "50000.00"}
        ]))
    );
    assert_eq!(template.default_settings, Some(json!({"is_published": false})));
    Ok(())
}

#[tokio::test]
async fn deleting_a_transaction_through_its_model_clears_review_links() -> Result<()> {
    let db = populated_db().await?;

    let booking = Transaction::find_by_id(1)
        .one(&db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("transaction 1 missing"))?;
    booking.delete(&db).await?;

    assert!(Attendee::find().all(&db).await?.is_empty());
    let review = EventReview::find_by_id(1)
        .one(&db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("review 1 missing"))?;
    assert_eq!(review.transaction_id, None);
    Ok(())
}
