//! ============================================================================
//! Access Module - Route guarding for the portal client
//! ============================================================================
//! Decides, for every navigation, whether the requested view renders or the
//! user is redirected.
//!
//! ## Rules
//! - **No identity** on a protected view goes back to `/login`
//! - **Wrong role** goes back to `/login` (the portal has no forbidden page)
//! - **Common views** (`/about`, `/help`) render for any signed-in role
//! - **Public views** render for anonymous users; `/login` and `/register`
//!   bounce a signed-in user to their role home instead
//!
//! ## Usage
//! ```rust,ignore
//! use civicecho_core::access::{authorize, Decision, Route};
//!
//! match authorize(session.identity(), Route::Complaint) {
//!     Decision::Render => show_complaint_form(),
//!     Decision::RedirectToLogin => goto(Route::Login),
//!     Decision::RedirectToRoleHome(home) => goto(home),
//! }
//! ```
//! ============================================================================

mod authorizer;
mod types;

// Re-export public types
pub use authorizer::{authorize, home_route};
pub use types::{Decision, Route};
