//! Dashboard error type.
//!
//! Store and dispatch operations return these synchronously.  A `NotFound`
//! kind reaching the caller is a logic error (the view gates its buttons on
//! current state) and is never retried.

use thiserror::Error;

use crate::{IncidentId, VolunteerId};

/// The top-level error type for `dc-core` and the base for sub-crates.
#[derive(Debug, Error, PartialEq)]
pub enum DcError {
    #[error("{0} not found")]
    IncidentNotFound(IncidentId),

    #[error("{0} not found")]
    VolunteerNotFound(VolunteerId),

    #[error("invalid transition for {entity}: {reason}")]
    InvalidTransition {
        entity: String,
        reason: &'static str,
    },

    #[error("travel target {incident} for {volunteer} is missing")]
    AnimationTargetMissing {
        volunteer: VolunteerId,
        incident:  IncidentId,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no {0} ids left to allocate")]
    IdsExhausted(&'static str),
}

impl DcError {
    /// `true` for either `NotFound` kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DcError::IncidentNotFound(_) | DcError::VolunteerNotFound(_))
    }

    /// Shorthand for an [`InvalidTransition`](DcError::InvalidTransition).
    pub fn invalid(entity: impl std::fmt::Display, reason: &'static str) -> Self {
        DcError::InvalidTransition { entity: entity.to_string(), reason }
    }
}

/// Shorthand result type for all `dc-*` crates.
pub type DcResult<T> = Result<T, DcError>;
