//! Batch orchestration: classifier selection, gating and status-update synthesis

pub mod processor;
pub mod summary;

use serde::Deserialize;

pub use processor::{ClassifiedEmail, EmailProcessor, ProcessingRun};
pub use summary::ProcessingSummary;

/// What the processor does when the LLM cannot classify one email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum LlmFallback {
    /// Fixed UNKNOWN / 0.1 classification
    #[default]
    #[serde(rename = "unknown")]
    FixedUnknown,
    /// Rule-based classification of the same email
    #[serde(rename = "rules")]
    RuleBased,
    /// Report the email as failed and move on
    #[serde(rename = "skip")]
    Skip,
}

impl LlmFallback {
    pub fn from_name(name: &str) -> Option<LlmFallback> {
        match name.trim().to_lowercase().as_str() {
            "unknown" => Some(LlmFallback::FixedUnknown),
            "rules" | "rule-based" => Some(LlmFallback::RuleBased),
            "skip" => Some(LlmFallback::Skip),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_names() {
        assert_eq!(LlmFallback::from_name("unknown"), Some(LlmFallback::FixedUnknown));
        assert_eq!(LlmFallback::from_name(" Rules "), Some(LlmFallback::RuleBased));
        assert_eq!(LlmFallback::from_name("skip"), Some(LlmFallback::Skip));
        assert_eq!(LlmFallback::from_name("retry"), None);
        assert_eq!(LlmFallback::default(), LlmFallback::FixedUnknown);
    }
}
