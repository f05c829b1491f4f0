//! ============================================================================
//! Route Authorizer - Render-or-redirect decisions
//! ============================================================================
//! Consulted on every navigation with the current identity. A wrong role
//! redirects to login exactly like a missing identity; the portal does not
//! distinguish the two in its redirect target.
//! ============================================================================

use tracing::debug;

use super::types::{Decision, Route};
use crate::session::{Identity, Role};

/// Home view for the given identity; login when nobody is signed in.
/// There are only two home destinations: citizens go to their dashboard,
/// everyone else signed-in goes to the government dashboard.
pub fn home_route(identity: Option<&Identity>) -> Route {
    match identity {
        None => Route::Login,
        Some(identity) if identity.role == Role::Citizen => Route::CitizensDashboard,
        Some(_) => Route::GovernmentDashboard,
    }
}

/// Decide whether `route` renders for `identity`.
pub fn authorize(identity: Option<&Identity>, route: Route) -> Decision {
    if route.is_public() {
        // Signed-in users are bounced off the login and registration forms;
        // the OTP and reset views stay reachable regardless of identity.
        if identity.is_some() && matches!(route, Route::Login | Route::Register) {
            return Decision::RedirectToRoleHome(home_route(identity));
        }
        return Decision::Render;
    }

    let Some(identity) = identity else {
        return Decision::RedirectToLogin;
    };

    match route.required_role() {
        Some(required) if identity.role != required => {
            debug!(
                "{} denied {} (holds role '{}')",
                identity.nid,
                route.path(),
                identity.role
            );
            Decision::RedirectToLogin
        }
        _ => Decision::Render,
    }
}
