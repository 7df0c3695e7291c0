//! Strongly typed identifier wrappers.
//!
//! Ids are `Copy + Ord + Hash` so they work as map keys and sort keys without
//! ceremony.  They are plain lookup keys: an incident holding a `VolunteerId`
//! (or the reverse) never owns the entity it names.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) => $label:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl $name {
            /// The id following `self` in allocation order.
            ///
            /// Saturates at the maximum value rather than wrapping, so an
            /// exhausted counter can never hand out a recycled id.
            #[inline]
            pub fn next(self) -> $name {
                $name(self.0.saturating_add(1))
            }

            /// Like [`next`](Self::next), but `None` once the id space is
            /// used up.  Counters that promise unique ids use this.
            #[inline]
            pub fn checked_next(self) -> Option<$name> {
                self.0.checked_add(1).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Stable identifier of a reported incident.  Never reused.
    pub struct IncidentId(u32) => "incident";
}

typed_id! {
    /// Stable identifier of a roster volunteer.
    pub struct VolunteerId(u32) => "volunteer";
}

typed_id! {
    /// Opaque handle for a marker object owned by the map collaborator.
    pub struct MarkerHandle(u64) => "marker";
}
