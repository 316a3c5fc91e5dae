//! Route guard: keeps the visible screen in line with the session.
//!
//! The guard watches the session store and, on mount and on every change of
//! the session token, replaces the current route with either the login screen
//! or the home screen. It holds no state of its own besides the last snapshot
//! it acted on.

use tokio::sync::watch;
use tracing::debug;

use crate::auth::{SessionState, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
}

/// Something that can switch the active screen without growing a back-stack.
pub trait Navigator {
    fn replace(&mut self, route: Route);
}

/// Where a session in this state belongs.
pub fn route_for(state: &SessionState) -> Route {
    if state.user.is_some() {
        Route::Home
    } else {
        Route::Login
    }
}

/// Redirect decision for a transition between two observed states.
///
/// `previous` is `None` on mount, which always redirects. After that only a
/// change of token redirects; loading and error updates do not.
pub fn redirect(previous: Option<&SessionState>, current: &SessionState) -> Option<Route> {
    match previous {
        Some(prev) if prev.token == current.token => None,
        _ => Some(route_for(current)),
    }
}

pub struct RouteGuard {
    rx: watch::Receiver<SessionState>,
    last: SessionState,
}

impl RouteGuard {
    /// Subscribe to the store and issue the initial redirect.
    pub fn mount(store: &SessionStore, navigator: &mut impl Navigator) -> Self {
        let mut rx = store.subscribe();
        let current = rx.borrow_and_update().clone();

        if let Some(route) = redirect(None, &current) {
            debug!(?route, "Initial redirect");
            navigator.replace(route);
        }

        Self { rx, last: current }
    }

    /// Apply any session change observed since the last call.
    ///
    /// Intermediate states published between two polls are coalesced; the
    /// decision is made against the latest one. Returns the route issued, if
    /// any.
    pub fn poll(&mut self, navigator: &mut impl Navigator) -> Option<Route> {
        // A closed channel means the store is gone; nothing can change anymore
        if !self.rx.has_changed().unwrap_or(false) {
            return None;
        }

        let current = self.rx.borrow_and_update().clone();
        let route = redirect(Some(&self.last), &current);
        self.last = current;

        if let Some(route) = route {
            debug!(?route, "Session token changed, redirecting");
            navigator.replace(route);
        }
        route
    }

    /// Last session state the guard acted on.
    pub fn session(&self) -> &SessionState {
        &self.last
    }
}
