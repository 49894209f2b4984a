//! Working set management for the parlay generator.
//!
//! A [`WorkingSet`] is the list of candidate events shown to the user plus the
//! ids the user has locked. [`EventSelectionManager`] owns one working set and
//! applies the two user commands to it: lock toggling and regeneration.
//!
//! Regeneration is all-or-nothing. The supplier's response is validated before
//! anything is replaced, so a failed call leaves the working set untouched.

use crate::event::{BettingEvent, EventId};
use crate::summary::{summarize, ParlaySummary};
use crate::traits::{EventSupplier, SupplyRequest};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Errors from selection commands. None of them modify the working set.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The event supplier failed (network, backend, decoding).
    #[error("event supplier failed: {0:#}")]
    Supplier(anyhow::Error),

    /// The supplier returned an id that was explicitly excluded.
    #[error("supplier returned excluded event {event_id}")]
    ExcludedEventReturned {
        /// The offending event id.
        event_id: EventId,
    },

    /// The supplier returned the same id twice.
    #[error("supplier returned event {event_id} more than once")]
    DuplicateEvent {
        /// The repeated event id.
        event_id: EventId,
    },

    /// Coupon name was empty after trimming.
    #[error("coupon name is required")]
    EmptyCouponName,

    /// Tried to save an empty working set.
    #[error("at least one bet event is required")]
    EmptyWorkingSet,
}

impl SelectionError {
    /// Returns true if the user can simply retry the command.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Supplier(_) | Self::ExcludedEventReturned { .. } | Self::DuplicateEvent { .. }
        )
    }
}

// =============================================================================
// Working Set
// =============================================================================

/// Ordered candidate events plus the locked subset.
///
/// Locked ids are always a subset of the event ids, including after
/// deserialization: stale locked ids in the input are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WorkingSetParts")]
pub struct WorkingSet {
    events: Vec<BettingEvent>,
    locked: BTreeSet<EventId>,
}

#[derive(Deserialize)]
struct WorkingSetParts {
    #[serde(default)]
    events: Vec<BettingEvent>,
    #[serde(default)]
    locked: BTreeSet<EventId>,
}

impl From<WorkingSetParts> for WorkingSet {
    fn from(parts: WorkingSetParts) -> Self {
        Self::from_parts(parts.events, parts.locked)
    }
}

impl WorkingSet {
    /// Creates a working set with nothing locked.
    #[must_use]
    pub fn new(events: Vec<BettingEvent>) -> Self {
        Self {
            events,
            locked: BTreeSet::new(),
        }
    }

    /// Creates a working set, keeping only locked ids that are present.
    #[must_use]
    pub fn from_parts(events: Vec<BettingEvent>, locked: impl IntoIterator<Item = EventId>) -> Self {
        let present: HashSet<EventId> = events.iter().map(|e| e.id).collect();
        let locked = locked.into_iter().filter(|id| present.contains(id)).collect();
        Self { events, locked }
    }

    #[must_use]
    pub fn events(&self) -> &[BettingEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<EventId> {
        self.events.iter().map(|e| e.id).collect()
    }

    #[must_use]
    pub fn contains(&self, event_id: EventId) -> bool {
        self.events.iter().any(|e| e.id == event_id)
    }

    #[must_use]
    pub fn is_locked(&self, event_id: EventId) -> bool {
        self.locked.contains(&event_id)
    }

    #[must_use]
    pub const fn locked_ids(&self) -> &BTreeSet<EventId> {
        &self.locked
    }

    /// Locked events in display order.
    pub fn locked_events(&self) -> impl Iterator<Item = &BettingEvent> {
        self.events.iter().filter(|e| self.locked.contains(&e.id))
    }

    /// Aggregated odds and schedule for the current events.
    #[must_use]
    pub fn summary(&self) -> ParlaySummary {
        summarize(&self.events)
    }
}

// =============================================================================
// Manager
// =============================================================================

/// Whether the generator runs with the full feature set or the public demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionMode {
    /// Locking enabled, any positive size.
    Standard,
    /// Locking disabled, sizes capped at `max_events`.
    Demo {
        /// Upper bound for the working set size.
        max_events: usize,
    },
}

/// Result of a lock toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockToggle {
    Locked,
    Unlocked,
    /// The id is not in the current working set; nothing changed.
    NotInWorkingSet,
    /// Locking is disabled in demo mode; nothing changed.
    DemoMode,
}

/// What a successful regeneration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenerateOutcome {
    /// Locked events carried over.
    pub kept: usize,
    /// Unlocked events dropped.
    pub discarded: usize,
    /// Replacements asked from the supplier.
    pub requested: usize,
    /// Replacements appended.
    pub received: usize,
}

/// Payload for saving the working set as a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponDraft {
    pub name: String,
    pub bet_event_ids: Vec<EventId>,
}

/// Owns a [`WorkingSet`] and applies lock and regenerate commands to it.
///
/// Commands take `&mut self`, so two regenerations of the same working set can
/// never interleave.
#[derive(Debug, Clone)]
pub struct EventSelectionManager {
    working_set: WorkingSet,
    mode: SelectionMode,
    default_size: usize,
}

impl EventSelectionManager {
    /// Creates a manager with an empty working set.
    #[must_use]
    pub fn new(default_size: usize) -> Self {
        Self {
            working_set: WorkingSet::default(),
            mode: SelectionMode::Standard,
            default_size,
        }
    }

    /// Creates a manager in demo mode.
    #[must_use]
    pub fn demo(default_size: usize, max_events: usize) -> Self {
        Self::new(default_size).with_mode(SelectionMode::Demo { max_events })
    }

    /// Resumes from a previously saved working set.
    #[must_use]
    pub fn with_working_set(mut self, working_set: WorkingSet) -> Self {
        self.working_set = working_set;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    #[must_use]
    pub fn into_working_set(self) -> WorkingSet {
        self.working_set
    }

    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    #[must_use]
    pub fn summary(&self) -> ParlaySummary {
        self.working_set.summary()
    }

    /// Size used for the first load: the demo cap in demo mode, otherwise
    /// the configured default.
    #[must_use]
    pub fn initial_size(&self) -> usize {
        match self.mode {
            SelectionMode::Standard => self.default_size,
            SelectionMode::Demo { max_events } => max_events,
        }
    }

    /// Turns a user-entered size into a target size.
    ///
    /// Missing or non-positive input falls back to the default. Demo mode
    /// caps the result.
    #[must_use]
    pub fn resolve_target_size(&self, requested: Option<i64>) -> usize {
        let size = match (self.mode, requested) {
            (SelectionMode::Standard, Some(n)) if n > 0 => {
                usize::try_from(n).unwrap_or(self.default_size)
            }
            _ => self.default_size,
        };

        match self.mode {
            SelectionMode::Standard => size,
            SelectionMode::Demo { max_events } => size.min(max_events),
        }
    }

    /// Flips the lock on `event_id`.
    ///
    /// Ids that are no longer displayed (for example toggles that raced a
    /// regeneration) are ignored and reported, never recorded.
    pub fn toggle_lock(&mut self, event_id: EventId) -> LockToggle {
        if matches!(self.mode, SelectionMode::Demo { .. }) {
            tracing::debug!(event_id, "lock toggle ignored in demo mode");
            return LockToggle::DemoMode;
        }

        if !self.working_set.contains(event_id) {
            tracing::warn!(event_id, "ignoring lock toggle for event not in working set");
            return LockToggle::NotInWorkingSet;
        }

        if self.working_set.locked.remove(&event_id) {
            LockToggle::Unlocked
        } else {
            self.working_set.locked.insert(event_id);
            LockToggle::Locked
        }
    }

    /// Replaces the whole working set with `target_size` fresh events and
    /// clears all locks.
    ///
    /// # Errors
    /// Returns [`SelectionError`] if the supplier fails or returns duplicates.
    /// The working set is unchanged in that case.
    pub async fn load<S>(&mut self, target_size: usize, supplier: &S) -> Result<usize, SelectionError>
    where
        S: EventSupplier + ?Sized,
    {
        let request = SupplyRequest {
            limit: target_size,
            exclude_ids: Vec::new(),
        };

        let events = Self::fetch(supplier, &request).await?;
        let received = events.len();
        self.working_set = WorkingSet::new(events);

        tracing::info!(received, "loaded working set");
        Ok(received)
    }

    /// Keeps locked events and replaces the rest.
    ///
    /// The new working set is the locked events in their previous order
    /// followed by the supplier's events in the order received. Every id in
    /// the current working set is excluded from the request. When
    /// `target_size` does not exceed the number of locked events the supplier
    /// is not called and the set shrinks to the locked events.
    ///
    /// # Errors
    /// Returns [`SelectionError`] if the supplier fails or its response
    /// contains an excluded or repeated id. The working set is unchanged in
    /// that case.
    pub async fn regenerate<S>(
        &mut self,
        target_size: usize,
        supplier: &S,
    ) -> Result<RegenerateOutcome, SelectionError>
    where
        S: EventSupplier + ?Sized,
    {
        let kept = self.working_set.locked.len();
        let discarded = self.working_set.len() - kept;
        let requested = target_size.saturating_sub(kept);

        let replacements = if requested > 0 {
            let request = SupplyRequest {
                limit: requested,
                exclude_ids: self.working_set.ids(),
            };
            Self::fetch(supplier, &request).await?
        } else {
            Vec::new()
        };

        let received = replacements.len();
        let locked = std::mem::take(&mut self.working_set.locked);
        let mut events: Vec<BettingEvent> = std::mem::take(&mut self.working_set.events)
            .into_iter()
            .filter(|e| locked.contains(&e.id))
            .collect();
        events.extend(replacements);

        self.working_set = WorkingSet { events, locked };

        tracing::info!(kept, discarded, requested, received, "regenerated working set");

        Ok(RegenerateOutcome {
            kept,
            discarded,
            requested,
            received,
        })
    }

    /// Builds the `POST /coupons/` payload for the current working set.
    ///
    /// # Errors
    /// Returns an error if the trimmed name is empty or the set has no events.
    pub fn coupon_draft(&self, name: &str) -> Result<CouponDraft, SelectionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SelectionError::EmptyCouponName);
        }
        if self.working_set.is_empty() {
            return Err(SelectionError::EmptyWorkingSet);
        }

        Ok(CouponDraft {
            name: name.to_string(),
            bet_event_ids: self.working_set.ids(),
        })
    }

    /// Calls the supplier and validates its response against the request.
    async fn fetch<S>(supplier: &S, request: &SupplyRequest) -> Result<Vec<BettingEvent>, SelectionError>
    where
        S: EventSupplier + ?Sized,
    {
        let mut events = supplier
            .random_events(request)
            .await
            .map_err(SelectionError::Supplier)?;

        let excluded: HashSet<EventId> = request.exclude_ids.iter().copied().collect();
        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if excluded.contains(&event.id) {
                tracing::warn!(event_id = event.id, "supplier ignored exclusion list");
                return Err(SelectionError::ExcludedEventReturned { event_id: event.id });
            }
            if !seen.insert(event.id) {
                tracing::warn!(event_id = event.id, "supplier returned duplicate event");
                return Err(SelectionError::DuplicateEvent { event_id: event.id });
            }
        }

        if events.len() > request.limit {
            tracing::warn!(
                limit = request.limit,
                received = events.len(),
                "supplier returned more events than requested, truncating"
            );
            events.truncate(request.limit);
        }

        Ok(events)
    }
}
