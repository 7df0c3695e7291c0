//! `dc-sim`: assembles the dispatch dashboard and drives its clock.
//!
//! # Step loop
//!
//! ```text
//! advance(by):
//!   until = now + by
//!   while a motion callback is due by `until`, earliest first:
//!     ① Urgency : refresh incident styling if the refresh interval elapsed
//!     ② Motion  : run the callback; draw positions
//!     ③ Mirror  : copy drawn positions into the store and onto the map
//!     ④ Arrival : finished travel → dispatch::on_arrival → store notifies
//!   move the clock to `until`; poll urgency once more
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`builder`]   | `DashboardBuilder`: validation, seeding, subscriptions   |
//! | [`dashboard`] | `Dashboard`, `ShutdownReport`                            |
//! | [`observer`]  | `DashboardObserver` hooks, `NoopObserver`                |
//! | [`config`]    | TOML loading for `DashboardConfig`                       |
//! | [`error`]     | `SimError`, `SimResult<T>`                               |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dc_core::DashboardConfig;
//! use dc_render::RecordingMap;
//! use dc_sim::{DashboardBuilder, NoopObserver};
//! use dc_store::SeedData;
//!
//! let mut dashboard = DashboardBuilder::with_virtual_clock(DashboardConfig::default(), RecordingMap::new())
//!     .seed(SeedData::demo())
//!     .build()?;
//! dashboard.advance(Duration::from_secs(10), &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod observer;

#[cfg(test)]
mod tests;

pub use builder::DashboardBuilder;
pub use config::{load_config, parse_config};
pub use dashboard::{Dashboard, ShutdownReport};
pub use error::{SimError, SimResult};
pub use observer::{DashboardObserver, NoopObserver};
