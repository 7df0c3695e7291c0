//! Timer and animation-frame scheduling.
//!
//! Every timeout and frame request returns a [`Token`].  The token is the
//! only handle on the pending callback: cancelling it removes the entry, so
//! a cancelled callback can never fire.  The motion simulator keeps at most
//! one live token per volunteer.
//!
//! [`Scheduler`] is the seam between the simulator and whatever drives time.
//! [`VirtualScheduler`] is the deterministic implementation: time only moves
//! when the owner pops due tasks or calls `advance_to`, so tests step through
//! animations without wall-clock delays.
//!
//! # Ordering
//!
//! Due tasks come out in `(due time, token)` order.  Tokens are issued from
//! a counter, so two tasks due at the same instant fire in the order they
//! were scheduled.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use dc_core::{Timestamp, VolunteerId};

/// Handle on one pending timeout or frame callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u64);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token#{}", self.0)
    }
}

/// What to do when a callback fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MotionTask {
    /// A timeout ended: the idle loop picks its next wander target.
    Wake(VolunteerId),
    /// Draw the next frame of the volunteer's current ease.
    Frame(VolunteerId),
}

impl MotionTask {
    #[inline]
    pub fn volunteer(self) -> VolunteerId {
        match self {
            MotionTask::Wake(v) | MotionTask::Frame(v) => v,
        }
    }
}

/// A callback whose time has come.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Due {
    pub at:    Timestamp,
    pub token: Token,
    pub task:  MotionTask,
}

// ── Scheduler trait ───────────────────────────────────────────────────────────

/// Timer + animation-frame source injected into the motion simulator.
pub trait Scheduler {
    /// Current scheduler time.
    fn now(&self) -> Timestamp;

    /// Run `task` once after `delay`.
    fn set_timeout(&mut self, delay: Duration, task: MotionTask) -> Token;

    /// Run `task` on the next animation frame.
    fn request_frame(&mut self, task: MotionTask) -> Token;

    /// Invalidate `token`.  Returns `false` if it already fired or was
    /// cancelled.
    fn cancel(&mut self, token: Token) -> bool;

    /// Invalidate every outstanding token; returns how many there were.
    fn cancel_all(&mut self) -> usize;

    /// Number of callbacks that can still fire.
    fn live_count(&self) -> usize;

    /// Earliest pending due time.
    fn next_due(&self) -> Option<Timestamp>;

    /// Remove the earliest task due at or before `until` and move the clock
    /// to its due time.  `None` when nothing is due by then.
    fn pop_due(&mut self, until: Timestamp) -> Option<Due>;

    /// Move the clock forward to `until` (never backwards).
    fn advance_to(&mut self, until: Timestamp);
}

// ── VirtualScheduler ──────────────────────────────────────────────────────────

/// Deterministic, manually advanced scheduler.
pub struct VirtualScheduler {
    now:            Timestamp,
    frame_interval: Duration,
    queue:          BTreeMap<(Timestamp, Token), MotionTask>,
    /// Live token → due time, so `cancel` finds the queue key in O(1).
    live:           HashMap<Token, Timestamp>,
    next_token:     u64,
}

impl VirtualScheduler {
    /// Start the clock at `start`; frames are spaced `frame_interval` apart.
    pub fn new(start: Timestamp, frame_interval: Duration) -> Self {
        Self {
            now: start,
            frame_interval,
            queue: BTreeMap::new(),
            live: HashMap::new(),
            next_token: 1,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Live callbacks that belong to `volunteer`.
    pub fn pending_for(&self, volunteer: VolunteerId) -> usize {
        self.queue.values().filter(|task| task.volunteer() == volunteer).count()
    }

    pub fn is_live(&self, token: Token) -> bool {
        self.live.contains_key(&token)
    }

    fn push(&mut self, at: Timestamp, task: MotionTask) -> Token {
        let token = Token(self.next_token);
        self.next_token += 1;
        self.queue.insert((at, token), task);
        self.live.insert(token, at);
        token
    }
}

impl Scheduler for VirtualScheduler {
    #[inline]
    fn now(&self) -> Timestamp {
        self.now
    }

    fn set_timeout(&mut self, delay: Duration, task: MotionTask) -> Token {
        self.push(self.now + delay, task)
    }

    fn request_frame(&mut self, task: MotionTask) -> Token {
        self.push(self.now + self.frame_interval, task)
    }

    fn cancel(&mut self, token: Token) -> bool {
        match self.live.remove(&token) {
            Some(at) => self.queue.remove(&(at, token)).is_some(),
            None => false,
        }
    }

    fn cancel_all(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        self.live.clear();
        n
    }

    fn live_count(&self) -> usize {
        self.live.len()
    }

    fn next_due(&self) -> Option<Timestamp> {
        self.queue.keys().next().map(|&(at, _)| at)
    }

    fn pop_due(&mut self, until: Timestamp) -> Option<Due> {
        let (&(at, token), _) = self.queue.first_key_value()?;
        if at > until {
            return None;
        }
        let task = self.queue.remove(&(at, token))?;
        self.live.remove(&token);
        self.now = self.now.max(at);
        Some(Due { at, token, task })
    }

    fn advance_to(&mut self, until: Timestamp) {
        self.now = self.now.max(until);
    }
}
