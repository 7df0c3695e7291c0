//! `dc-core`: foundational types for the `dispatch_console` dashboard.
//!
//! Every other `dc-*` crate depends on this one.  It has no `dc-*`
//! dependencies and only `rand` and `thiserror` externally, plus optional
//! `serde`.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `IncidentId`, `VolunteerId`, `MarkerHandle`           |
//! | [`geo`]         | `GeoPoint`, interpolation, degree offsets             |
//! | [`time`]        | `Timestamp` (Unix milliseconds)                       |
//! | [`rng`]         | `VolunteerRng` (per-volunteer), `SimRng` (global)     |
//! | [`config`]      | `DashboardConfig`                                     |
//! | [`error`]       | `DcError`, `DcResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::DashboardConfig;
pub use error::{DcError, DcResult};
pub use geo::GeoPoint;
pub use ids::{IncidentId, MarkerHandle, VolunteerId};
pub use rng::{SimRng, VolunteerRng};
pub use time::Timestamp;
