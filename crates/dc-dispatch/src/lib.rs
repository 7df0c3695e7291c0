//! `dc-dispatch`: the dispatch state machine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`action`]  | `Action` verbs, `Direction`, `Outcome`, `Skip`                |
//! | [`machine`] | One function per verb plus [`apply`] for `Action` values      |
//!
//! # Failure policy
//!
//! Unknown ids come back as `DcError::*NotFound`.  A verb issued in a state
//! where it makes no sense (declining a volunteer who is not pending,
//! stepping past the end of the pipeline, a late arrival) is not an error:
//! it returns [`Outcome::NoOp`] with the reason, leaves the store untouched
//! and sends no notification.  The view is expected to gate its buttons on
//! current status; the no-op covers races between independent UI actions.
//!
//! Nothing here holds state, owns timers or does I/O.  Every verb is a plain
//! function over `&mut EntityStore`.

pub mod action;
pub mod machine;


pub use action::{Action, Direction, Outcome, Skip};
pub use machine::{accept, advance_status, apply, assign, complete, decline, on_arrival, report, step_to};
