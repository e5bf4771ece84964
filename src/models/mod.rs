//! # Data Models
//!
//! SeaORM entity models for every table provisioned by the bootstrap.

pub mod attendee;
pub mod event;
pub mod event_review;
pub mod event_template;
pub mod organizer_profile;
pub mod promotion;
pub mod ticket;
pub mod transaction;
pub mod user;
pub mod user_session;

pub use attendee::Entity as Attendee;
pub use event::Entity as Event;
pub use event_review::Entity as EventReview;
pub use event_template::Entity as EventTemplate;
pub use organizer_profile::Entity as OrganizerProfile;
pub use promotion::Entity as Promotion;
pub use ticket::Entity as Ticket;
pub use transaction::Entity as Transaction;
pub use user::Entity as User;
pub use user_session::Entity as UserSession;
