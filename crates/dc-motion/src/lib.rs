//! `dc-motion`: the motion simulator for volunteer markers.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`easing`]    | `ease_in_out` curve                                            |
//! | [`scheduler`] | `Scheduler` trait, `VirtualScheduler`, `Token`, `MotionTask`   |
//! | [`track`]     | `Tween`, `Behavior`: per-volunteer animation state             |
//! | [`simulator`] | `MotionSimulator<S>`: behavior selection and frame handling    |
//!
//! # Driving model
//!
//! All work happens on one thread.  The simulator never blocks: an animation
//! schedules its next frame and returns, and the owner pops due callbacks
//! from the scheduler and hands them back through
//! [`MotionSimulator::handle`].  Missing arrival targets are logged and
//! absorbed; nothing here returns an error.

pub mod easing;
pub mod scheduler;
pub mod simulator;
pub mod track;


pub use easing::ease_in_out;
pub use scheduler::{Due, MotionTask, Scheduler, Token, VirtualScheduler};
pub use simulator::{MotionEvent, MotionSimulator, MotionTiming};
pub use track::{Behavior, BehaviorKind, Tween};
