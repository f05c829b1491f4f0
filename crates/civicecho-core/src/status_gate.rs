//! ============================================================================
//! Status Gate - Complaint lifecycle rules
//! ============================================================================
//! Client-side pre-submission checks mirroring the backend's lifecycle rules:
//! - Updates into Resolved/Closed must carry a non-empty solution
//! - Feedback opens only once a complaint is Resolved or Closed
//! - Only the owning citizen may cancel, and only while still Pending
//!
//! These are pure predicates. The backend re-validates every one of them;
//! the gate exists so a doomed request never leaves the client.
//! ============================================================================

use crate::types::{Complaint, ComplaintStatus};

/// Statuses that require a recorded solution before the update is sent.
pub fn requires_solution(status: ComplaintStatus) -> bool {
    status.is_terminal()
}

/// Whether a status update may be submitted. False when no target status was
/// picked, or when a terminal status is missing its solution text.
pub fn can_submit_update(target: Option<ComplaintStatus>, solution: &str) -> bool {
    match target {
        None => false,
        Some(status) => !(requires_solution(status) && solution.trim().is_empty()),
    }
}

/// Citizens may rate and comment only once the complaint reached a terminal
/// state.
pub fn is_feedback_eligible(complaint: &Complaint) -> bool {
    complaint.status.is_terminal()
}

/// A pending complaint may still be withdrawn, but only by the citizen who
/// filed it. Citizen dashboard payloads omit the owner nid because they are
/// already scoped to the requester; an explicit owner must match.
pub fn is_cancelable(complaint: &Complaint, requester_nid: &str) -> bool {
    complaint.status == ComplaintStatus::Pending
        && complaint
            .nid
            .as_deref()
            .map_or(true, |owner| owner == requester_nid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn complaint(status: ComplaintStatus, owner: Option<&str>) -> Complaint {
        Complaint {
            id: 1,
            title: "Streetlight out".to_string(),
            description: String::new(),
            category: Category::PublicInfrastructure,
            location: None,
            district: None,
            upazila: None,
            zone: None,
            created_at: None,
            status,
            priority: None,
            citizen_name: None,
            attachments: Vec::new(),
            solution: None,
            feedback: None,
            rating: None,
            nid: owner.map(str::to_string),
        }
    }

    #[test]
    fn test_terminal_update_requires_solution() {
        assert!(!can_submit_update(Some(ComplaintStatus::Resolved), ""));
        assert!(!can_submit_update(Some(ComplaintStatus::Resolved), "   "));
        assert!(!can_submit_update(Some(ComplaintStatus::Closed), ""));
        assert!(can_submit_update(
            Some(ComplaintStatus::Resolved),
            "fixed the pothole"
        ));
        assert!(can_submit_update(Some(ComplaintStatus::Closed), "duplicate of #12"));
    }

    #[test]
    fn test_non_terminal_update_makes_solution_optional() {
        assert!(can_submit_update(Some(ComplaintStatus::Pending), ""));
        assert!(can_submit_update(Some(ComplaintStatus::InProgress), ""));
        assert!(can_submit_update(Some(ComplaintStatus::OnHold), ""));
    }

    #[test]
    fn test_unset_status_never_passes() {
        assert!(!can_submit_update(None, ""));
        assert!(!can_submit_update(None, "a perfectly good solution"));
    }

    #[test]
    fn test_feedback_eligibility() {
        assert!(is_feedback_eligible(&complaint(ComplaintStatus::Resolved, None)));
        assert!(is_feedback_eligible(&complaint(ComplaintStatus::Closed, None)));
        assert!(!is_feedback_eligible(&complaint(ComplaintStatus::Pending, None)));
        assert!(!is_feedback_eligible(&complaint(ComplaintStatus::InProgress, None)));
        assert!(!is_feedback_eligible(&complaint(ComplaintStatus::OnHold, None)));
    }

    #[test]
    fn test_cancel_only_while_pending() {
        assert!(is_cancelable(&complaint(ComplaintStatus::Pending, Some("BD1")), "BD1"));
        for status in [
            ComplaintStatus::InProgress,
            ComplaintStatus::OnHold,
            ComplaintStatus::Resolved,
            ComplaintStatus::Closed,
        ] {
            assert!(!is_cancelable(&complaint(status, Some("BD1")), "BD1"));
        }
    }

    #[test]
    fn test_cancel_only_by_owner() {
        assert!(!is_cancelable(&complaint(ComplaintStatus::Pending, Some("BD1")), "BD2"));
        // Owner omitted: the payload was already scoped to the requester.
        assert!(is_cancelable(&complaint(ComplaintStatus::Pending, None), "BD2"));
    }
}
