//! ============================================================================
//! Access Types - Portal routes and authorization decisions
//! ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::Role;

/// Every view the portal can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Login,
    Register,
    VerifyOtp,
    ResetPassword,
    CitizensDashboard,
    Complaint,
    Feedback,
    GovernmentDashboard,
    Solution,
    About,
    Help,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Login,
        Route::Register,
        Route::VerifyOtp,
        Route::ResetPassword,
        Route::CitizensDashboard,
        Route::Complaint,
        Route::Feedback,
        Route::GovernmentDashboard,
        Route::Solution,
        Route::About,
        Route::Help,
    ];

    /// Path as the portal exposes it.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::VerifyOtp => "/verify-otp",
            Route::ResetPassword => "/reset-password",
            Route::CitizensDashboard => "/citizens-dashboard",
            Route::Complaint => "/complaint",
            Route::Feedback => "/feedback",
            Route::GovernmentDashboard => "/government-dashboard",
            Route::Solution => "/solution",
            Route::About => "/about",
            Route::Help => "/help",
        }
    }

    /// Public views never require an identity.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Login | Route::Register | Route::VerifyOtp | Route::ResetPassword
        )
    }

    /// Role a signed-in user must hold to see this view; `None` for views
    /// open to any authenticated role.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::CitizensDashboard | Route::Complaint | Route::Feedback => Some(Role::Citizen),
            Route::GovernmentDashboard | Route::Solution => Some(Role::GovernmentOfficial),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The requested view renders.
    Render,
    /// Bounce to `/login`. Covers both "not signed in" and "wrong role".
    RedirectToLogin,
    /// A signed-in user asked for `/login` or `/register`; send them home.
    RedirectToRoleHome(Route),
}
