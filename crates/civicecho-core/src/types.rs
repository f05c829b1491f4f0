//! ============================================================================
//! Core Types for the CivicEcho Client
//! ============================================================================
//! Domain model shared across the client: complaint records as the backend
//! returns them, the fixed category/status/priority vocabularies, and the
//! client-side error taxonomy.
//! ============================================================================

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle states a complaint moves through on the backend.
/// `Pending` is set on creation; `Resolved` and `Closed` are terminal for
/// the citizen-facing feedback flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    OnHold,
    Resolved,
    Closed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 5] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::OnHold,
        ComplaintStatus::Resolved,
        ComplaintStatus::Closed,
    ];

    /// Status string as the backend spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::OnHold => "On Hold",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Closed => "Closed",
        }
    }

    /// Case-insensitive parse; the backend is not consistent about casing.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(ComplaintStatus::Pending),
            "in progress" | "in-progress" | "in_progress" => Some(ComplaintStatus::InProgress),
            "on hold" | "on-hold" | "on_hold" => Some(ComplaintStatus::OnHold),
            "resolved" => Some(ComplaintStatus::Resolved),
            "closed" => Some(ComplaintStatus::Closed),
            _ => None,
        }
    }

    /// Resolved and Closed end the complaint's active life; they gate both
    /// the solution requirement and feedback eligibility.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ComplaintStatus::Resolved | ComplaintStatus::Closed)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ComplaintStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("unknown complaint status '{}'", s))
    }
}

impl From<ComplaintStatus> for String {
    fn from(status: ComplaintStatus) -> Self {
        status.as_str().to_string()
    }
}

/// The ten complaint categories the portal routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    PublicInfrastructure,
    WasteManagement,
    TrafficAndTransport,
    HealthAndSafety,
    EnvironmentAndPollution,
    Education,
    LawAndOrder,
    Utilities,
    CorruptionAndGovernance,
    HousingAndUrbanDevelopment,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::PublicInfrastructure,
        Category::WasteManagement,
        Category::TrafficAndTransport,
        Category::HealthAndSafety,
        Category::EnvironmentAndPollution,
        Category::Education,
        Category::LawAndOrder,
        Category::Utilities,
        Category::CorruptionAndGovernance,
        Category::HousingAndUrbanDevelopment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PublicInfrastructure => "Public Infrastructure",
            Category::WasteManagement => "Waste Management",
            Category::TrafficAndTransport => "Traffic and Transport",
            Category::HealthAndSafety => "Health and Safety",
            Category::EnvironmentAndPollution => "Environment and Pollution",
            Category::Education => "Education",
            Category::LawAndOrder => "Law and Order",
            Category::Utilities => "Utilities",
            Category::CorruptionAndGovernance => "Corruption and Governance",
            Category::HousingAndUrbanDevelopment => "Housing and Urban Development",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().to_lowercase() == needle)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("unknown complaint category '{}'", s))
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

/// Priority assigned by the backend when a complaint is triaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Priority {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("unknown priority '{}'", s))
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

/// Complaint record as the backend returns it. The client never mutates
/// these locally; the backend owns the authoritative copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    #[serde(deserialize_with = "de_flexible_id")]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// The citizen dashboard payload calls this field `issue`.
    #[serde(alias = "issue")]
    pub category: Category,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub upazila: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    pub status: ComplaintStatus,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, rename = "citizenName")]
    pub citizen_name: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    /// Owning citizen's NID, when the payload includes it.
    #[serde(default)]
    pub nid: Option<String>,
}

/// Notification entry shown in the dashboard sidebars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "de_flexible_id")]
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Profile block on the citizen dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitizenProfile {
    #[serde(default)]
    pub nid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "memberSince")]
    pub member_since: Option<String>,
    #[serde(default, rename = "totalComplaints")]
    pub total_complaints: Option<i64>,
}

/// Header block on the government dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfficialInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
}

/// Client-facing failure taxonomy. Every variant degrades to a visible
/// message; none are fatal to the running client, and none are retried.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered, but not with the JSON the contract promises.
    /// Reported distinctly from plain request failure.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The backend processed the request and rejected it (`success: false`).
    /// Carries the backend-supplied message verbatim.
    #[error("{0}")]
    Rejected(String),
}

/// Accepts both numeric and stringified ids; the PHP backend emits either.
pub(crate) fn de_flexible_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid id '{}'", s))),
    }
}

/// Parses the backend's `YYYY-MM-DD HH:MM:SS` timestamps, falling back to
/// RFC 3339 and bare dates. Unparseable or missing values become `None`,
/// matching how the original UI tolerated them.
fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!(ComplaintStatus::parse("pending"), Some(ComplaintStatus::Pending));
        assert_eq!(ComplaintStatus::parse("In Progress"), Some(ComplaintStatus::InProgress));
        assert_eq!(ComplaintStatus::parse("ON HOLD"), Some(ComplaintStatus::OnHold));
        assert_eq!(ComplaintStatus::parse("resolved"), Some(ComplaintStatus::Resolved));
        assert_eq!(ComplaintStatus::parse("shredded"), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(ComplaintStatus::Resolved.is_terminal());
        assert!(ComplaintStatus::Closed.is_terminal());
        assert!(!ComplaintStatus::Pending.is_terminal());
        assert!(!ComplaintStatus::InProgress.is_terminal());
        assert!(!ComplaintStatus::OnHold.is_terminal());
    }

    #[test]
    fn test_category_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("waste management"), Some(Category::WasteManagement));
        assert_eq!(Category::parse("Potholes"), None);
    }

    #[test]
    fn test_complaint_deserializes_government_payload() {
        let json = serde_json::json!({
            "id": "42",
            "category": "Utilities",
            "citizenName": "Rahim",
            "location": "Mirpur",
            "created_at": "2025-03-01 09:30:00",
            "status": "pending",
            "priority": "High",
            "zone": "Dhaka North",
            "attachments": ["uploads/42/photo.jpg"]
        });
        let complaint: Complaint = serde_json::from_value(json).unwrap();
        assert_eq!(complaint.id, 42);
        assert_eq!(complaint.category, Category::Utilities);
        assert_eq!(complaint.status, ComplaintStatus::Pending);
        assert_eq!(complaint.priority, Some(Priority::High));
        assert_eq!(complaint.citizen_name.as_deref(), Some("Rahim"));
        assert!(complaint.created_at.is_some());
    }

    #[test]
    fn test_complaint_accepts_issue_alias() {
        let json = serde_json::json!({
            "id": 7,
            "title": "Broken street light",
            "issue": "Public Infrastructure",
            "status": "In Progress",
            "created_at": "2025-06-10T14:00:00Z"
        });
        let complaint: Complaint = serde_json::from_value(json).unwrap();
        assert_eq!(complaint.category, Category::PublicInfrastructure);
        assert_eq!(complaint.status, ComplaintStatus::InProgress);
    }

    #[test]
    fn test_timestamp_fallbacks() {
        assert!(parse_timestamp("2025-03-01 09:30:00").is_some());
        assert!(parse_timestamp("2025-06-10T14:00:00Z").is_some());
        assert!(parse_timestamp("2025-06-10").is_some());
        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = serde_json::json!({
            "id": 1,
            "category": "Education",
            "status": "Escalated"
        });
        assert!(serde_json::from_value::<Complaint>(json).is_err());
    }
}
