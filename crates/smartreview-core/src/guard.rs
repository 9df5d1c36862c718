//! Route guarding for protected views.
//!
//! A navigation starts in `Resolving` while the session bootstraps; it ends
//! in exactly one of `Authorized` or `Unauthorized`. A resolution belonging
//! to an abandoned navigation (the user navigated again before it landed) is
//! discarded instead of mutating state for a view that no longer exists.

use crate::api::User;

/// Admission state for the current navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    /// Session resolution in flight. Render neither outcome.
    #[default]
    Resolving,
    /// A confirmed user exists; the protected view may render.
    Authorized,
    /// No user; redirect to login.
    Unauthorized,
}

/// Token tying a resolution back to the navigation that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Navigation(u64);

/// Per-navigation admission gate over the session's resolved state.
#[derive(Debug, Default)]
pub struct RouteGuard {
    state: GuardState,
    next: u64,
    active: Option<u64>,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// True only once a terminal decision exists for the active navigation.
    pub fn is_resolved(&self) -> bool {
        self.state != GuardState::Resolving
    }

    /// Starts a new navigation: state returns to `Resolving` and any
    /// resolution from an earlier navigation becomes stale.
    pub fn begin(&mut self) -> Navigation {
        let nav = Navigation(self.next);
        self.next += 1;
        self.active = Some(nav.0);
        self.state = GuardState::Resolving;
        nav
    }

    /// Applies a bootstrap outcome for the given navigation.
    ///
    /// Returns false (and changes nothing) when the navigation is no longer
    /// the active one.
    pub fn resolve(&mut self, nav: Navigation, user: Option<&User>) -> bool {
        if self.active != Some(nav.0) {
            return false;
        }
        self.active = None;
        self.state = if user.is_some() {
            GuardState::Authorized
        } else {
            GuardState::Unauthorized
        };
        true
    }
}
