//! ============================================================================
//! Complaint Endpoints - Dashboards, submission, updates, feedback
//! ============================================================================
//! The complaint submission endpoint takes multipart form data: a `data`
//! part holding the JSON payload plus one `attachments[]` part per file.
//! Everything else is plain JSON in, JSON envelope out.
//! ============================================================================

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Ack, PortalClient};
use crate::types::{
    ApiError, CitizenProfile, Complaint, ComplaintStatus, Notification, OfficialInfo,
};
use crate::validate::ComplaintDraft;

#[derive(Debug, Serialize)]
struct NidRequest<'a> {
    nid: &'a str,
}

#[derive(Debug, Serialize)]
struct ComplaintRef<'a> {
    nid: &'a str,
    complaint_id: i64,
}

#[derive(Debug, Serialize)]
struct SolutionUpdate<'a> {
    nid: &'a str,
    complaint_id: i64,
    solution: Option<&'a str>,
    status: &'a str,
}

#[derive(Debug, Serialize)]
struct FeedbackRequest<'a> {
    nid: &'a str,
    complaint_id: i64,
    rating: u8,
    feedback: &'a str,
}

#[derive(Debug, Serialize)]
struct DistrictRequest<'a> {
    district: &'a str,
}

/// Citizen dashboard payload: the caller's complaints plus their profile.
#[derive(Debug, Default, Deserialize)]
pub struct CitizenDashboard {
    #[serde(default)]
    pub complaints: Vec<Complaint>,
    #[serde(default)]
    pub profile: CitizenProfile,
}

/// Government dashboard payload: the official's zone queue.
#[derive(Debug, Default, Deserialize)]
pub struct GovernmentDashboard {
    #[serde(default, rename = "officialInfo")]
    pub official_info: OfficialInfo,
    #[serde(default)]
    pub complaints: Vec<Complaint>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Deserialize)]
struct ComplaintDetails {
    complaint: Complaint,
}

#[derive(Debug, Deserialize)]
struct NotificationsPayload {
    #[serde(default)]
    notifications: Vec<Notification>,
}

/// Receipt for a submitted complaint.
#[derive(Debug, Deserialize)]
pub struct SubmitReceipt {
    #[serde(deserialize_with = "crate::types::de_flexible_id")]
    pub complaint_id: i64,
    #[serde(default)]
    pub uploaded_files: Vec<String>,
}

/// Category and location vocabularies for the complaint form. With a
/// district given, carries that district's upazilas.
#[derive(Debug, Default, Deserialize)]
pub struct LocationOptions {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub districts: Vec<String>,
    #[serde(default)]
    pub upazilas: Vec<String>,
}

/// One attachment ready for upload. Callers read the bytes; the client only
/// moves them.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PortalClient {
    /// The citizen's own complaints and profile.
    pub async fn citizen_dashboard(&self, nid: &str) -> Result<CitizenDashboard, ApiError> {
        self.post_json("citizendashboard.php", &NidRequest { nid })
            .await
    }

    /// The official's zone queue, header info, and notifications.
    pub async fn government_dashboard(&self, nid: &str) -> Result<GovernmentDashboard, ApiError> {
        self.post_json("get_government_dashboard.php", &NidRequest { nid })
            .await
    }

    /// Full detail for one complaint in the official's zone.
    pub async fn complaint_details(
        &self,
        nid: &str,
        complaint_id: i64,
    ) -> Result<Complaint, ApiError> {
        let details: ComplaintDetails = self
            .post_json(
                "get_complaints_details.php",
                &ComplaintRef { nid, complaint_id },
            )
            .await?;
        Ok(details.complaint)
    }

    /// Submit a new complaint with optional attachments.
    pub async fn submit_complaint(
        &self,
        nid: &str,
        draft: &ComplaintDraft,
        attachments: Vec<AttachmentUpload>,
    ) -> Result<SubmitReceipt, ApiError> {
        let category = draft.category.map(|c| c.as_str()).unwrap_or_default();
        let data = serde_json::json!({
            "nid": nid,
            "complaintTitle": draft.title.trim(),
            "complaintText": draft.description.trim(),
            "category": category,
            "district": draft.district,
            "upazila": draft.upazila,
        })
        .to_string();

        let mut form = reqwest::multipart::Form::new().text("data", data);
        for attachment in attachments {
            let part = reqwest::multipart::Part::bytes(attachment.bytes)
                .file_name(attachment.file_name);
            form = form.part("attachments[]", part);
        }

        let receipt: SubmitReceipt = self.post_multipart("complaint.php", form).await?;
        info!(
            "Complaint submitted: id {} ({} files uploaded)",
            receipt.complaint_id,
            receipt.uploaded_files.len()
        );
        Ok(receipt)
    }

    /// Record a status update, with the solution text for terminal states.
    /// An empty or whitespace-only solution is sent as null, as the form did.
    pub async fn submit_solution(
        &self,
        nid: &str,
        complaint_id: i64,
        status: ComplaintStatus,
        solution: Option<&str>,
    ) -> Result<(), ApiError> {
        let trimmed = solution.map(str::trim).filter(|s| !s.is_empty());
        let _: Ack = self
            .post_json(
                "solution.php",
                &SolutionUpdate {
                    nid,
                    complaint_id,
                    solution: trimmed,
                    status: status.as_str(),
                },
            )
            .await?;
        info!("Complaint {} updated to {}", complaint_id, status);
        Ok(())
    }

    /// Cancel (permanently delete) a pending complaint.
    pub async fn cancel_complaint(&self, nid: &str, complaint_id: i64) -> Result<(), ApiError> {
        let _: Ack = self
            .post_json("cancel_complaint.php", &ComplaintRef { nid, complaint_id })
            .await?;
        info!("Complaint {} cancelled", complaint_id);
        Ok(())
    }

    /// Rate a resolved complaint.
    pub async fn submit_feedback(
        &self,
        nid: &str,
        complaint_id: i64,
        rating: u8,
        feedback: &str,
    ) -> Result<(), ApiError> {
        let _: Ack = self
            .post_json(
                "feedback.php",
                &FeedbackRequest {
                    nid,
                    complaint_id,
                    rating,
                    feedback: feedback.trim(),
                },
            )
            .await?;
        Ok(())
    }

    /// The caller's notifications.
    pub async fn notifications(&self, nid: &str) -> Result<Vec<Notification>, ApiError> {
        let payload: NotificationsPayload = self
            .post_json("notifications.php", &NidRequest { nid })
            .await?;
        Ok(payload.notifications)
    }

    /// Form vocabularies; pass a district to fetch its upazilas.
    pub async fn location_options(
        &self,
        district: Option<&str>,
    ) -> Result<LocationOptions, ApiError> {
        match district {
            Some(district) => {
                self.post_json("get_categories_locations.php", &DistrictRequest { district })
                    .await
            }
            None => {
                self.post_json("get_categories_locations.php", &serde_json::json!({}))
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_update_serializes_null_solution() {
        let update = SolutionUpdate {
            nid: "GOV9",
            complaint_id: 42,
            solution: None,
            status: ComplaintStatus::OnHold.as_str(),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "nid": "GOV9",
                "complaint_id": 42,
                "solution": null,
                "status": "On Hold"
            })
        );
    }

    #[test]
    fn test_feedback_request_shape() {
        let request = FeedbackRequest {
            nid: "BD1",
            complaint_id: 7,
            rating: 5,
            feedback: "Fixed within a week",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["complaint_id"], 7);
        assert_eq!(json["rating"], 5);
    }

    #[test]
    fn test_citizen_dashboard_parses_with_defaults() {
        let payload: CitizenDashboard = serde_json::from_value(serde_json::json!({
            "success": true,
            "complaints": [],
            "profile": {"nid": "BD1", "name": "Rahim", "totalComplaints": 3}
        }))
        .unwrap();
        assert!(payload.complaints.is_empty());
        assert_eq!(payload.profile.total_complaints, Some(3));
    }

    #[test]
    fn test_government_dashboard_parses_official_info() {
        let payload: GovernmentDashboard = serde_json::from_value(serde_json::json!({
            "success": true,
            "officialInfo": {"name": "Karim", "zone": "Dhaka North"},
            "complaints": [{
                "id": 11,
                "category": "Waste Management",
                "status": "Pending",
                "citizenName": "Rahim",
                "created_at": "2025-05-05 10:00:00"
            }],
            "notifications": [{"id": 1, "type": "new", "message": "New complaint"}]
        }))
        .unwrap();
        assert_eq!(payload.official_info.zone.as_deref(), Some("Dhaka North"));
        assert_eq!(payload.complaints.len(), 1);
        assert_eq!(payload.notifications.len(), 1);
    }

    #[test]
    fn test_submit_receipt_parses() {
        let receipt: SubmitReceipt = serde_json::from_value(serde_json::json!({
            "success": true,
            "complaint_id": 99,
            "uploaded_files": ["uploads/99/a.jpg"]
        }))
        .unwrap();
        assert_eq!(receipt.complaint_id, 99);
        assert_eq!(receipt.uploaded_files.len(), 1);
    }
}
