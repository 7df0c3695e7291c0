//! Change subscriptions.
//!
//! Components register a callback with [`EntityStore::subscribe`] and get it
//! back out with [`EntityStore::unsubscribe`] on teardown.  Callbacks run
//! synchronously, in registration order, after a mutation has fully applied
//! and before the mutating call returns.  They receive a borrowed
//! [`Snapshot`], so they cannot mutate the store while it is notifying.
//!
//! [`EntityStore::subscribe`]: crate::EntityStore::subscribe
//! [`EntityStore::unsubscribe`]: crate::EntityStore::unsubscribe

use dc_core::{IncidentId, VolunteerId};

use crate::{Incident, Volunteer};

/// Read-only view of both collections after a mutation.
pub struct Snapshot<'a> {
    /// All incidents in insertion order.
    pub incidents:  &'a [Incident],
    /// All volunteers in roster order.
    pub volunteers: &'a [Volunteer],
    /// Which entities the mutation touched.
    pub changed:    &'a ChangeSet,
}

impl<'a> Snapshot<'a> {
    pub fn incident(&self, id: IncidentId) -> Option<&'a Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    pub fn volunteer(&self, id: VolunteerId) -> Option<&'a Volunteer> {
        self.volunteers.iter().find(|v| v.id == id)
    }
}

/// Ids touched by one mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub incidents:  Vec<IncidentId>,
    pub volunteers: Vec<VolunteerId>,
}

impl ChangeSet {
    pub fn incident(id: IncidentId) -> Self {
        Self { incidents: vec![id], volunteers: vec![] }
    }

    pub fn volunteer(id: VolunteerId) -> Self {
        Self { incidents: vec![], volunteers: vec![id] }
    }

    pub fn with_incident(mut self, id: IncidentId) -> Self {
        if !self.incidents.contains(&id) {
            self.incidents.push(id);
        }
        self
    }

    #[inline]
    pub fn touches_incidents(&self) -> bool {
        !self.incidents.is_empty()
    }

    #[inline]
    pub fn touches_volunteers(&self) -> bool {
        !self.volunteers.is_empty()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty() && self.volunteers.is_empty()
    }
}

/// Token returned by `subscribe`; pass it to `unsubscribe`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub type Callback = Box<dyn FnMut(&Snapshot<'_>)>;

/// Registered callbacks, in registration order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next:    u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify(&mut self, snapshot: &Snapshot<'_>) {
        for (_, callback) in &mut self.entries {
            callback(snapshot);
        }
    }
}
