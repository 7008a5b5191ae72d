//! Email intent classification: shared types, rule-based and Ollama-backed classifiers

pub mod ollama;
pub mod rules;
pub mod taxonomy;
pub mod throttle;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::email::Email;
use crate::error::LlmError;

pub use ollama::OllamaClassifier;
pub use rules::RuleBasedClassifier;
pub use taxonomy::Taxonomy;
pub use throttle::{FixedDelay, LinearBackoff, NoDelay, Throttle};

/// Confidence attached to every UNKNOWN classification
pub const UNKNOWN_CONFIDENCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    InterviewScheduled,
    /// Reserved, never produced by the classifiers
    InterviewReminder,
    FeedbackReceived,
    Rejection,
    Offer,
    /// Reserved, never produced by the classifiers
    GeneralUpdate,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::InterviewScheduled => "INTERVIEW_SCHEDULED",
            Intent::InterviewReminder => "INTERVIEW_REMINDER",
            Intent::FeedbackReceived => "FEEDBACK_RECEIVED",
            Intent::Rejection => "REJECTION",
            Intent::Offer => "OFFER",
            Intent::GeneralUpdate => "GENERAL_UPDATE",
            Intent::Unknown => "UNKNOWN",
        }
    }

    /// Closed lookup for labels returned by a model. Anything outside the
    /// five classification labels maps to `Unknown`.
    pub fn from_label(label: &str) -> Intent {
        match label.trim() {
            "INTERVIEW_SCHEDULED" => Intent::InterviewScheduled,
            "REJECTION" => Intent::Rejection,
            "OFFER" => Intent::Offer,
            "FEEDBACK_RECEIVED" => Intent::FeedbackReceived,
            _ => Intent::Unknown,
        }
    }

    /// Intents that can produce a job status transition
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            Intent::InterviewScheduled | Intent::Rejection | Intent::Offer | Intent::FeedbackReceived
        )
    }

    /// Status hint attached to a rule-based classification's extracted data
    pub fn status_hint(&self) -> Option<JobStatus> {
        match self {
            Intent::InterviewScheduled => Some(JobStatus::Interviewing),
            Intent::Rejection => Some(JobStatus::Rejected),
            Intent::Offer => Some(JobStatus::Offered),
            _ => None,
        }
    }

    /// New tracker status for a status update. Feedback keeps the
    /// application in the interviewing stage.
    pub fn tracker_status(&self) -> Option<JobStatus> {
        match self {
            Intent::InterviewScheduled | Intent::FeedbackReceived => Some(JobStatus::Interviewing),
            Intent::Rejection => Some(JobStatus::Rejected),
            Intent::Offer => Some(JobStatus::Offered),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Saved,
    Applied,
    Screening,
    Interviewing,
    Rejected,
    Offered,
    Accepted,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Saved => "SAVED",
            JobStatus::Applied => "APPLIED",
            JobStatus::Screening => "SCREENING",
            JobStatus::Interviewing => "INTERVIEWING",
            JobStatus::Rejected => "REJECTED",
            JobStatus::Offered => "OFFERED",
            JobStatus::Accepted => "ACCEPTED",
        }
    }

    pub fn from_label(label: &str) -> Option<JobStatus> {
        match label.trim().to_uppercase().as_str() {
            "SAVED" => Some(JobStatus::Saved),
            "APPLIED" => Some(JobStatus::Applied),
            "SCREENING" => Some(JobStatus::Screening),
            "INTERVIEWING" => Some(JobStatus::Interviewing),
            "REJECTED" => Some(JobStatus::Rejected),
            "OFFERED" => Some(JobStatus::Offered),
            "ACCEPTED" => Some(JobStatus::Accepted),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional fields pulled out of an email alongside its intent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    /// Normalized `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_change: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_required: Option<String>,
}

impl ExtractedData {
    pub fn is_empty(&self) -> bool {
        self.job_title.is_none()
            && self.interview_date.is_none()
            && self.status_change.is_none()
            && self.action_required.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub intent: Intent,
    pub company_name: String,
    pub confidence: f64,
    pub extracted_data: ExtractedData,
}

impl Classification {
    /// Builds a classification, clamping confidence into [0, 1].
    /// UNKNOWN always carries `UNKNOWN_CONFIDENCE`.
    pub fn new(
        intent: Intent,
        company_name: impl Into<String>,
        confidence: f64,
        extracted_data: ExtractedData,
    ) -> Self {
        let confidence = if intent == Intent::Unknown {
            UNKNOWN_CONFIDENCE
        } else if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Classification {
            intent,
            company_name: company_name.into(),
            confidence,
            extracted_data,
        }
    }

    /// Fixed fallback used when a backend cannot produce a classification
    pub fn unknown() -> Self {
        Classification {
            intent: Intent::Unknown,
            company_name: String::new(),
            confidence: UNKNOWN_CONFIDENCE,
            extracted_data: ExtractedData::default(),
        }
    }

    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

/// Result of asking a backend to classify one email
#[derive(Debug)]
pub enum ClassificationOutcome {
    Parsed(Classification),
    /// The backend answered but its answer could not be used
    ParseFailure { raw: String, reason: String },
    /// The backend could not be reached or returned an error status
    TransportFailure(LlmError),
}

impl ClassificationOutcome {
    /// Collapse into a classification, using the fixed UNKNOWN fallback on failure
    pub fn into_classification(self) -> Classification {
        match self {
            ClassificationOutcome::Parsed(classification) => classification,
            _ => Classification::unknown(),
        }
    }
}

/// A classification backend the email processor can drive
pub trait ClassificationStrategy: Send + Sync {
    /// Classify a single email
    fn classify<'a>(&'a self, email: &'a Email) ->
        Pin<Box<dyn Future<Output = ClassificationOutcome> + Send + 'a>>;

    /// Check that the backend is usable before a batch starts
    fn probe<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

    /// Get the name of this backend (for logging)
    fn strategy_name(&self) -> &str;
}
