//! `RecordingMap`: an in-memory [`MapBackend`] that keeps every call.
//!
//! Used by tests to assert exactly what the adapter asked the map to do, and
//! by the demo in place of a real tile library.  Every call is also logged
//! at `trace` level.

use std::collections::BTreeMap;
use std::time::Duration;

use dc_core::{GeoPoint, MarkerHandle};
use tracing::trace;

use crate::{MapBackend, MarkerKind, MarkerStyle};

/// One call received by the map.
#[derive(Clone, Debug, PartialEq)]
pub enum MapCall {
    Create { handle: MarkerHandle, kind: MarkerKind, at: GeoPoint },
    Move { handle: MarkerHandle, at: GeoPoint },
    Restyle { handle: MarkerHandle },
    Destroy { handle: MarkerHandle },
    FlyTo { at: GeoPoint, zoom: f64, duration: Duration },
    FitBounds { points: Vec<GeoPoint>, padding_px: u32 },
}

/// A marker currently on the recorded map.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedMarker {
    pub kind:     MarkerKind,
    pub position: GeoPoint,
    pub style:    MarkerStyle,
}

#[derive(Debug)]
pub struct RecordingMap {
    next:  MarkerHandle,
    live:  BTreeMap<MarkerHandle, RecordedMarker>,
    calls: Vec<MapCall>,
}

impl Default for RecordingMap {
    fn default() -> Self {
        Self { next: MarkerHandle(1), live: BTreeMap::new(), calls: Vec::new() }
    }
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call in order.
    pub fn calls(&self) -> &[MapCall] {
        &self.calls
    }

    /// Return and forget the calls recorded so far.  Live markers are kept.
    pub fn take_calls(&mut self) -> Vec<MapCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&RecordedMarker> {
        self.live.get(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_of_kind(&self, kind: MarkerKind) -> usize {
        self.live.values().filter(|m| m.kind == kind).count()
    }

    /// Calls other than `Move`.
    pub fn structural_calls(&self) -> impl Iterator<Item = &MapCall> + '_ {
        self.calls.iter().filter(|c| !matches!(c, MapCall::Move { .. }))
    }
}

impl MapBackend for RecordingMap {
    fn create_marker(&mut self, kind: MarkerKind, at: GeoPoint, style: &MarkerStyle) -> MarkerHandle {
        let handle = self.next;
        self.next = handle.next();
        trace!(%handle, ?kind, %at, label = %style.label, "create marker");
        self.live.insert(handle, RecordedMarker { kind, position: at, style: style.clone() });
        self.calls.push(MapCall::Create { handle, kind, at });
        handle
    }

    fn update_marker_position(&mut self, handle: MarkerHandle, at: GeoPoint) {
        trace!(%handle, %at, "move marker");
        if let Some(marker) = self.live.get_mut(&handle) {
            marker.position = at;
        }
        self.calls.push(MapCall::Move { handle, at });
    }

    fn update_marker_style(&mut self, handle: MarkerHandle, style: &MarkerStyle) {
        trace!(%handle, emphasis = ?style.emphasis, "restyle marker");
        if let Some(marker) = self.live.get_mut(&handle) {
            marker.style = style.clone();
        }
        self.calls.push(MapCall::Restyle { handle });
    }

    fn destroy_marker(&mut self, handle: MarkerHandle) {
        trace!(%handle, "destroy marker");
        self.live.remove(&handle);
        self.calls.push(MapCall::Destroy { handle });
    }

    fn fly_to(&mut self, at: GeoPoint, zoom: f64, duration: Duration) {
        trace!(%at, zoom, ?duration, "fly to");
        self.calls.push(MapCall::FlyTo { at, zoom, duration });
    }

    fn fit_bounds(&mut self, points: &[GeoPoint], padding_px: u32) {
        trace!(points = points.len(), padding_px, "fit bounds");
        self.calls.push(MapCall::FitBounds { points: points.to_vec(), padding_px });
    }
}
