//! `dc-render`: the marker renderer adapter.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`map`]       | `MapBackend` trait, `MarkerStyle`, `MapEvent`, `MarkerTarget` |
//! | [`urgency`]   | `Urgency` pulse parameters from elapsed unresolved time       |
//! | [`hover`]     | Emphasis rules for the hovered incident                       |
//! | [`renderer`]  | `MarkerRenderer<M>`: reconcile, positions, hover, camera      |
//! | [`recording`] | `RecordingMap`: in-memory backend for tests and the demo      |
//!
//! The renderer owns every map object it creates.  It never reads the store
//! directly: it is fed snapshots from store notifications and driven
//! positions from the motion simulator, and it destroys all of its markers
//! on [`MarkerRenderer::teardown`].

pub mod hover;
pub mod map;
pub mod recording;
pub mod renderer;
pub mod urgency;

#[cfg(test)]
mod tests;

pub use map::{Emphasis, MapBackend, MapEvent, MarkerKind, MarkerStyle, MarkerTarget, Tone};
pub use recording::{MapCall, RecordedMarker, RecordingMap};
pub use renderer::{MarkerRenderer, RenderSettings};
pub use urgency::Urgency;
