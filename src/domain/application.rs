use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Unique identifier for a job application card (UUID v4 string)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Generates a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ApplicationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ApplicationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ApplicationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Column a job application sits in.
///
/// `Unspecified` is the wire default and is never a valid card status.
/// Unknown labels decode to it, as with [`ApplicationStatus::from_db`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Interview,
    Offer,
    Rejected,
    Withdrawn,
    Accepted,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl ApplicationStatus {
    /// Valid statuses in board display order
    pub const COLUMNS: [ApplicationStatus; 7] = [
        Self::Applied,
        Self::Screening,
        Self::Interview,
        Self::Offer,
        Self::Rejected,
        Self::Withdrawn,
        Self::Accepted,
    ];

    pub fn is_specified(&self) -> bool {
        *self != Self::Unspecified
    }

    /// Storage label, e.g. `APPLIED`
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Applied => "APPLIED",
            Self::Screening => "SCREENING",
            Self::Interview => "INTERVIEW",
            Self::Offer => "OFFER",
            Self::Rejected => "REJECTED",
            Self::Withdrawn => "WITHDRAWN",
            Self::Accepted => "ACCEPTED",
        }
    }

    /// Parses a storage label. Unknown labels map to `Unspecified`.
    pub fn from_db(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "APPLIED" => Self::Applied,
            "SCREENING" => Self::Screening,
            "INTERVIEW" => Self::Interview,
            "OFFER" => Self::Offer,
            "REJECTED" => Self::Rejected,
            "WITHDRAWN" => Self::Withdrawn,
            "ACCEPTED" => Self::Accepted,
            _ => Self::Unspecified,
        }
    }

    /// Fails with `InvalidStatus` for the sentinel
    pub fn ensure_specified(self) -> Result<Self, crate::error::KisekiError> {
        if self.is_specified() {
            Ok(self)
        } else {
            Err(crate::error::KisekiError::InvalidStatus(
                self.as_db_str().to_string(),
            ))
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = crate::error::KisekiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db(s).ensure_specified()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => write!(f, "Unspecified"),
            Self::Applied => write!(f, "Applied"),
            Self::Screening => write!(f, "Screening"),
            Self::Interview => write!(f, "Interviewing"),
            Self::Offer => write!(f, "Offered"),
            Self::Rejected => write!(f, "Rejected"),
            Self::Withdrawn => write!(f, "Withdrawn"),
            Self::Accepted => write!(f, "Accepted"),
        }
    }
}

/// Fields supplied when creating a job application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplication {
    pub company: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub applied_on: DateTime<Utc>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub position: String,
}

impl NewApplication {
    pub fn new(company: impl Into<String>, title: impl Into<String>, status: ApplicationStatus) -> Self {
        Self {
            company: company.into(),
            title: title.into(),
            description: None,
            notes: None,
            cv: None,
            cover_letter: None,
            applied_on: Utc::now(),
            status,
            position: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl ApplicationUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// True when the update carries no field at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A job application card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: ApplicationId,
    pub company: String,
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub cv: Option<String>,
    pub cover_letter: Option<String>,
    pub applied_on: DateTime<Utc>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub position: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl JobApplication {
    /// Builds a card from create input, stamping both timestamps with now
    pub fn new(id: ApplicationId, input: NewApplication) -> Self {
        let now = Utc::now();
        Self {
            id,
            company: input.company,
            title: input.title,
            description: input.description,
            notes: input.notes,
            cv: input.cv,
            cover_letter: input.cover_letter,
            applied_on: input.applied_on,
            status: input.status,
            position: input.position,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Merges the present fields of `update` and refreshes `updated_at`
    pub fn apply_update(&mut self, update: &ApplicationUpdate) {
        if let Some(company) = &update.company {
            self.company = company.clone();
        }
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(notes) = &update.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(cv) = &update.cv {
            self.cv = Some(cv.clone());
        }
        if let Some(cover_letter) = &update.cover_letter {
            self.cover_letter = Some(cover_letter.clone());
        }
        if let Some(applied_on) = update.applied_on {
            self.applied_on = applied_on;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(position) = &update.position {
            self.position = position.clone();
        }
        self.updated_at = Utc::now();
    }

    /// Moves the card to a column slot
    pub fn move_to(&mut self, status: ApplicationStatus, position: impl Into<String>) {
        self.status = status;
        self.position = position.into();
        self.updated_at = Utc::now();
    }

    /// Soft-deletes the card
    pub fn mark_deleted(&mut self) {
        self.deleted_at = Some(Utc::now());
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
