//! `dc-store`: the entity store: canonical incident and volunteer state.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`model`]    | `Incident`, `Volunteer`, status enums, `IncidentDraft`        |
//! | [`store`]    | `EntityStore`: keyed collections and named transitions        |
//! | [`observer`] | `Snapshot`, `ChangeSet`, `SubscriptionId`                     |
//! | [`seed`]     | `SeedData`, CSV loaders                                       |
//! | [`error`]    | `SeedError`, `SeedResult<T>`                                  |
//!
//! # Concurrency model
//!
//! The store is single-threaded and holds no lock.  Each transition applies
//! all of its effects, then notifies subscribers synchronously with a
//! read-only snapshot.  A subscriber therefore always observes a settled
//! state, and no two transitions interleave within one notification.
//!
//! Cross references (volunteer → incident, incident → volunteer history) are
//! plain ids resolved through the store, never embedded pointers.

pub mod error;
pub mod model;
pub mod observer;
pub mod seed;
pub mod store;


pub use error::{SeedError, SeedResult};
pub use model::{
    HomeLocation, Incident, IncidentDraft, IncidentOverview, IncidentStatus, Severity, Volunteer,
    VolunteerStatus,
};
pub use observer::{ChangeSet, Snapshot, SubscriptionId};
pub use seed::{SeedData, SeedIncident, SeedVolunteer, load_incidents_reader, load_roster_reader};
pub use store::EntityStore;
