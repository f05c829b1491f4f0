//! ============================================================================
//! Form Validation - Complaint and feedback drafts
//! ============================================================================
//! Client-side checks run before anything is sent to the backend. Violations
//! come back as a full list so the user can fix the whole form in one pass.
//! The backend re-validates everything; this gate is a UX convenience, not a
//! security boundary.
//! ============================================================================

use crate::types::Category;

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;
pub const FEEDBACK_MIN_CHARS: usize = 10;

/// File types the backend accepts as attachments.
const ALLOWED_ATTACHMENT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

/// Attachment metadata checked before the bytes are ever read.
#[derive(Debug, Clone)]
pub struct AttachmentMeta {
    pub file_name: String,
    pub size_bytes: u64,
}

impl AttachmentMeta {
    fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }
}

/// New complaint as entered on the submission form.
#[derive(Debug, Clone, Default)]
pub struct ComplaintDraft {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub district: String,
    pub upazila: String,
    pub attachments: Vec<AttachmentMeta>,
}

impl ComplaintDraft {
    /// Collect every violation instead of stopping at the first.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push("Complaint title is required".to_string());
        } else if title.chars().count() < TITLE_MIN_CHARS {
            errors.push(format!(
                "Complaint title must be at least {} characters long",
                TITLE_MIN_CHARS
            ));
        } else if title.chars().count() > TITLE_MAX_CHARS {
            errors.push(format!(
                "Complaint title must not exceed {} characters",
                TITLE_MAX_CHARS
            ));
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.push("Complaint description is required".to_string());
        } else if description.chars().count() < DESCRIPTION_MIN_CHARS {
            errors.push(format!(
                "Complaint description must be at least {} characters long",
                DESCRIPTION_MIN_CHARS
            ));
        } else if description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.push(format!(
                "Complaint description must not exceed {} characters",
                DESCRIPTION_MAX_CHARS
            ));
        }

        if self.category.is_none() {
            errors.push("Please select a category".to_string());
        }
        if self.district.trim().is_empty() {
            errors.push("Please select a district".to_string());
        }
        if self.upazila.trim().is_empty() {
            errors.push("Please select an upazila".to_string());
        }

        for attachment in &self.attachments {
            let allowed = attachment
                .extension()
                .map_or(false, |ext| ALLOWED_ATTACHMENT_EXTENSIONS.contains(&ext.as_str()));
            if !allowed {
                errors.push(format!(
                    "File \"{}\" has unsupported format. Only JPG, PNG, and PDF are allowed.",
                    attachment.file_name
                ));
            }
            if attachment.size_bytes > MAX_ATTACHMENT_BYTES {
                errors.push(format!(
                    "File \"{}\" is too large. Maximum size is 5MB.",
                    attachment.file_name
                ));
            }
        }

        errors
    }
}

/// Feedback as entered on the rating form. A rating of 0 means "not picked".
#[derive(Debug, Clone, Default)]
pub struct FeedbackDraft {
    pub rating: u8,
    pub feedback: String,
}

impl FeedbackDraft {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let feedback = self.feedback.trim();
        if feedback.is_empty() {
            errors.push("Feedback is required".to_string());
        } else if feedback.chars().count() < FEEDBACK_MIN_CHARS {
            errors.push(format!(
                "Feedback must be at least {} characters long",
                FEEDBACK_MIN_CHARS
            ));
        }

        if self.rating == 0 {
            errors.push("Please rate your experience".to_string());
        } else if self.rating > 5 {
            errors.push("Rating must be between 1 and 5".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> ComplaintDraft {
        ComplaintDraft {
            title: "Streetlight out on Road 4".to_string(),
            description: "The light has been dark for two weeks now.".to_string(),
            category: Some(Category::PublicInfrastructure),
            district: "Dhaka".to_string(),
            upazila: "Dhanmondi".to_string(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(valid_draft().validate().is_empty());
    }

    #[test]
    fn test_title_bounds() {
        let mut draft = valid_draft();
        draft.title = "Bad".to_string();
        assert_eq!(draft.validate().len(), 1);

        draft.title = "x".repeat(101);
        assert_eq!(draft.validate().len(), 1);

        draft.title = "   ".to_string();
        assert!(draft.validate()[0].contains("required"));
    }

    #[test]
    fn test_description_bounds() {
        let mut draft = valid_draft();
        draft.description = "too short".to_string();
        assert_eq!(draft.validate().len(), 1);

        draft.description = "y".repeat(501);
        assert_eq!(draft.validate().len(), 1);
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let draft = ComplaintDraft::default();
        let errors = draft.validate();
        // Title, description, category, district, upazila.
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_attachment_rules() {
        let mut draft = valid_draft();
        draft.attachments = vec![
            AttachmentMeta {
                file_name: "photo.JPG".to_string(),
                size_bytes: 1024,
            },
            AttachmentMeta {
                file_name: "notes.docx".to_string(),
                size_bytes: 1024,
            },
            AttachmentMeta {
                file_name: "scan.pdf".to_string(),
                size_bytes: MAX_ATTACHMENT_BYTES + 1,
            },
        ];
        let errors = draft.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("notes.docx"));
        assert!(errors[1].contains("scan.pdf"));
    }

    #[test]
    fn test_feedback_rules() {
        let mut draft = FeedbackDraft {
            rating: 4,
            feedback: "Resolved quickly, thanks!".to_string(),
        };
        assert!(draft.validate().is_empty());

        draft.feedback = "ok".to_string();
        assert_eq!(draft.validate().len(), 1);

        draft.rating = 0;
        assert_eq!(draft.validate().len(), 2);

        draft.rating = 6;
        draft.feedback = "Great work by the city team".to_string();
        assert_eq!(draft.validate().len(), 1);
    }
}
