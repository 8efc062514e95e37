use log::{debug, warn};

use super::{Route, DASHBOARD_PATH, LOGIN_PATH};
use crate::auth::SessionState;

// Longest legitimate chain is `/` -> `/dashboard` -> `/login`.
const MAX_REDIRECTS: usize = 8;

/// Outcome of the guard for one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(&'static str),
}

/// Decides whether navigation to `target` may proceed.
///
/// Protected views redirect unauthenticated sessions to the login view; the login view
/// redirects authenticated sessions to the dashboard. Everything else proceeds.
pub fn guard<S: SessionState + ?Sized>(target: &Route, session: &S) -> Navigation {
    let authenticated = session.is_authenticated();
    if target.requires_auth() && !authenticated {
        Navigation::Redirect(LOGIN_PATH)
    } else if *target == Route::Login && authenticated {
        Navigation::Redirect(DASHBOARD_PATH)
    } else {
        Navigation::Proceed
    }
}

impl<T: SessionState + ?Sized> SessionState for &T {
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }
}

/// Navigation state: the view currently shown and how it got there.
#[derive(Debug)]
pub struct Router<S> {
    session: S,
    current: Option<Route>,
    history: Vec<Route>,
}

impl<S: SessionState> Router<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            current: None,
            history: Vec::new(),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn current(&self) -> Option<&Route> {
        self.current.as_ref()
    }

    /// Every route navigated to, in order.
    pub fn history(&self) -> &[Route] {
        &self.history
    }

    /// Where navigating to `path` would land, following static and guard redirects.
    pub fn resolve(&self, path: &str) -> Route {
        let mut target = Route::resolve(path);
        for _ in 0..MAX_REDIRECTS {
            if let Some(to) = target.redirect() {
                debug!("{} redirects to {}", target.path(), to);
                target = Route::resolve(to);
                continue;
            }
            match guard(&target, &self.session) {
                Navigation::Proceed => return target,
                Navigation::Redirect(to) => {
                    debug!("guard redirected {} to {}", target.path(), to);
                    target = Route::resolve(to);
                }
            }
        }
        warn!("Too many redirects navigating to {}; stopping at {}", path, target.path());
        target
    }

    /// Navigates to `path` and returns the route actually shown.
    pub fn navigate(&mut self, path: &str) -> &Route {
        let route = self.resolve(path);
        self.history.push(route.clone());
        self.current.insert(route)
    }
}
