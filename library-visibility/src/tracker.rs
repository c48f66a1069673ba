//! Stale-resolution guard.
//!
//! A profile can change while a resolution for its previous revision is
//! still awaiting lookups. [`ScopeTracker`] hands out a ticket per
//! resolution and only applies the result of the newest ticket, so the
//! last write wins regardless of completion order.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use library_catalog::Profile;

use crate::lookup::ReferenceLookup;
use crate::scope::{Scope, ScopeResolver};

/// Ticket for one in-flight resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolutionTicket {
    generation: u64,
}

impl ResolutionTicket {
    /// Generation this ticket was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    generation: u64,
    current: Option<Scope>,
}

/// Holds the applied scope and discards stale resolutions.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    state: Mutex<TrackerState>,
}

impl ScopeTracker {
    /// Creates a tracker with no applied scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new resolution, superseding every earlier ticket.
    pub fn begin(&self) -> ResolutionTicket {
        let mut state = self.lock();
        state.generation += 1;
        ResolutionTicket {
            generation: state.generation,
        }
    }

    /// Apply a resolved scope if its ticket is still the newest.
    ///
    /// Returns `false` (and leaves the current scope untouched) for a stale
    /// ticket.
    pub fn apply(&self, ticket: ResolutionTicket, scope: Scope) -> bool {
        let mut state = self.lock();
        if ticket.generation != state.generation {
            debug!(
                ticket = ticket.generation,
                latest = state.generation,
                "Discarding stale scope resolution"
            );
            return false;
        }
        state.current = Some(scope);
        true
    }

    /// Check if a ticket is still the newest.
    pub fn is_current(&self, ticket: ResolutionTicket) -> bool {
        self.lock().generation == ticket.generation
    }

    /// The applied scope, if any.
    pub fn current(&self) -> Option<Scope> {
        self.lock().current.clone()
    }

    /// Resolve and apply a profile's scope.
    ///
    /// Returns the scope if it was applied, `None` if a newer resolution
    /// began while this one was in flight.
    pub async fn refresh<L: ReferenceLookup>(
        &self,
        resolver: &ScopeResolver<L>,
        profile: &Profile,
    ) -> Option<Scope> {
        let ticket = self.begin();
        let scope = resolver.resolve_scope(profile).await;
        if self.apply(ticket, scope.clone()) {
            Some(scope)
        } else {
            None
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        // State is plain data, so a poisoned lock is still consistent.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
