//! ============================================================================
//! Complaint List Filters - In-memory search, filter, sort
//! ============================================================================
//! The dashboards fetch a full complaint list once and refine it locally.
//! Citizens slice their own complaints by keyword, relative date window,
//! category and status; officials work a queue that always hides terminal
//! complaints and adds priority plus an absolute date range.
//! ============================================================================

use chrono::{Months, NaiveDate, NaiveDateTime, TimeDelta};

use crate::types::{Category, Complaint, ComplaintStatus, Priority};

/// Relative date windows offered on the citizen dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    Today,
    PastWeek,
    PastMonth,
    PastYear,
}

impl DateWindow {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "today" => Some(DateWindow::Today),
            "week" | "past-week" => Some(DateWindow::PastWeek),
            "month" | "past-month" => Some(DateWindow::PastMonth),
            "year" | "past-year" => Some(DateWindow::PastYear),
            _ => None,
        }
    }

    /// Earliest timestamp still inside the window, relative to `now`.
    fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            DateWindow::Today => now.date().and_hms_opt(0, 0, 0).unwrap_or(now),
            DateWindow::PastWeek => now - TimeDelta::days(7),
            DateWindow::PastMonth => now.checked_sub_months(Months::new(1)).unwrap_or(now),
            DateWindow::PastYear => now.checked_sub_months(Months::new(12)).unwrap_or(now),
        }
    }
}

/// Sort orders offered on the citizen dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
    Status,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Some(SortOrder::Newest),
            "oldest" => Some(SortOrder::Oldest),
            "title" => Some(SortOrder::Title),
            "status" => Some(SortOrder::Status),
            _ => None,
        }
    }

    fn sort(&self, complaints: &mut [Complaint]) {
        match self {
            // Undated complaints sink to the end in either direction.
            SortOrder::Newest => complaints.sort_by(|a, b| match (a.created_at, b.created_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }),
            SortOrder::Oldest => complaints.sort_by(|a, b| match (a.created_at, b.created_at) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }),
            SortOrder::Title => {
                complaints.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            }
            SortOrder::Status => {
                complaints.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str()))
            }
        }
    }
}

/// Filter panel of the citizen dashboard.
#[derive(Debug, Clone, Default)]
pub struct CitizenFilter {
    /// Matches id, title, or description, case-insensitively.
    pub search: Option<String>,
    pub window: Option<DateWindow>,
    pub category: Option<Category>,
    pub status: Option<ComplaintStatus>,
    pub sort: SortOrder,
}

impl CitizenFilter {
    pub fn apply(&self, complaints: &[Complaint], now: NaiveDateTime) -> Vec<Complaint> {
        let mut filtered: Vec<Complaint> = complaints
            .iter()
            .filter(|c| self.matches(c, now))
            .cloned()
            .collect();
        self.sort.sort(&mut filtered);
        filtered
    }

    fn matches(&self, complaint: &Complaint, now: NaiveDateTime) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = complaint.id.to_string().contains(&term)
                || complaint.title.to_lowercase().contains(&term)
                || complaint.description.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(window) = self.window {
            match complaint.created_at {
                Some(ts) if ts >= window.cutoff(now) => {}
                _ => return false,
            }
        }
        if let Some(category) = self.category {
            if complaint.category != category {
                return false;
            }
        }
        if let Some(status) = self.status {
            if complaint.status != status {
                return false;
            }
        }
        true
    }
}

/// Filter panel of the government views. Resolved and Closed complaints are
/// always excluded; officials work the unresolved queue.
#[derive(Debug, Clone, Default)]
pub struct OfficialFilter {
    /// Matches id, category, citizen name, or location, case-insensitively.
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    /// Inclusive through the end of the day.
    pub to: Option<NaiveDate>,
    pub category: Option<Category>,
    pub status: Option<ComplaintStatus>,
    pub priority: Option<Priority>,
}

impl OfficialFilter {
    pub fn apply(&self, complaints: &[Complaint]) -> Vec<Complaint> {
        complaints
            .iter()
            .filter(|c| self.matches(c))
            .cloned()
            .collect()
    }

    fn matches(&self, complaint: &Complaint) -> bool {
        if complaint.status.is_terminal() {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = complaint.id.to_string().contains(&term)
                || complaint.category.as_str().to_lowercase().contains(&term)
                || complaint
                    .citizen_name
                    .as_deref()
                    .map_or(false, |name| name.to_lowercase().contains(&term))
                || complaint
                    .location
                    .as_deref()
                    .map_or(false, |loc| loc.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(from) = self.from {
            match complaint.created_at {
                Some(ts) if ts.date() >= from => {}
                _ => return false,
            }
        }
        if let Some(to) = self.to {
            match complaint.created_at {
                Some(ts) if ts.date() <= to => {}
                _ => return false,
            }
        }
        if let Some(category) = self.category {
            if complaint.category != category {
                return false;
            }
        }
        if let Some(status) = self.status {
            if complaint.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if complaint.priority != Some(priority) {
                return false;
            }
        }
        true
    }
}
