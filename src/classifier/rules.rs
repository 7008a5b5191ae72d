use std::collections::HashMap;
use std::future::{ready, Future};
use std::pin::Pin;

use log::debug;
use regex::Regex;

use super::taxonomy::Taxonomy;
use super::{Classification, ClassificationOutcome, ClassificationStrategy, ExtractedData, Intent};
use crate::email::Email;

const BASE_CONFIDENCE: f64 = 0.5;
const KEYWORD_WEIGHT: f64 = 0.4;
const MAX_RULE_CONFIDENCE: f64 = 0.95;

/// Deterministic keyword classifier. Pure function of the email content.
#[derive(Debug, Clone)]
pub struct RuleBasedClassifier {
    /// (intent, lowercased keywords) in priority order
    intents: Vec<(Intent, Vec<String>)>,
    known_domains: HashMap<String, String>,
    company_patterns: Vec<Regex>,
    suffix_regex: Regex,
}

impl RuleBasedClassifier {
    pub fn new(taxonomy: Taxonomy) -> Result<Self, regex::Error> {
        let company_patterns = taxonomy.company_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let suffixes: Vec<String> = taxonomy.organizational_suffixes
            .iter()
            .map(|suffix| regex::escape(suffix))
            .collect();
        let suffix_regex = Regex::new(&format!(r"(?i)\b(?:{})\b", suffixes.join("|")))?;

        let intents = taxonomy.intents
            .into_iter()
            .map(|set| {
                let keywords = set.keywords.iter().map(|k| k.to_lowercase()).collect();
                (set.intent, keywords)
            })
            .collect();

        let known_domains = taxonomy.known_domains
            .into_iter()
            .map(|(domain, company)| (domain.to_lowercase(), company))
            .collect();

        Ok(RuleBasedClassifier {
            intents,
            known_domains,
            company_patterns,
            suffix_regex,
        })
    }

    /// Classifier backed by the built-in job-search taxonomy
    pub fn job_search() -> Result<Self, regex::Error> {
        Self::new(Taxonomy::job_search())
    }

    pub fn classify(&self, email: &Email) -> Classification {
        let text = format!("{} {}", email.subject, email.body).to_lowercase();

        let intent = self.determine_intent(&text);
        let company_name = self.extract_company_name(email);
        let confidence = self.calculate_confidence(&text, intent);

        let extracted_data = ExtractedData {
            status_change: intent.status_hint(),
            ..ExtractedData::default()
        };

        debug!(
            "Rule-based classification for {}: {} ({:.2}), company '{}'",
            email.id, intent, confidence, company_name
        );

        Classification::new(intent, company_name, confidence, extracted_data)
    }

    fn determine_intent(&self, text: &str) -> Intent {
        self.intents
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::Unknown)
    }

    fn calculate_confidence(&self, text: &str, intent: Intent) -> f64 {
        let keywords = match self.intents.iter().find(|(i, _)| *i == intent) {
            Some((_, keywords)) if !keywords.is_empty() => keywords,
            _ => return super::UNKNOWN_CONFIDENCE,
        };

        let matches = keywords.iter().filter(|k| text.contains(k.as_str())).count();
        let fraction = matches as f64 / keywords.len() as f64;

        (BASE_CONFIDENCE + KEYWORD_WEIGHT * fraction).min(MAX_RULE_CONFIDENCE)
    }

    fn extract_company_name(&self, email: &Email) -> String {
        let domain = email.sender_domain();

        if let Some(company) = self.known_domains.get(&domain) {
            return company.clone();
        }

        let text = format!("{} {}", email.subject, email.body);
        for pattern in &self.company_patterns {
            if let Some(candidate) = pattern.captures(&text).and_then(|caps| caps.get(1)) {
                let cleaned = self.clean_company_name(candidate.as_str());
                if !cleaned.is_empty() {
                    return cleaned;
                }
            }
        }

        self.clean_company_name(&domain)
    }

    /// Strips organizational suffixes and angle brackets, then trims
    pub fn clean_company_name(&self, name: &str) -> String {
        let without_suffixes = self.suffix_regex.replace_all(name, "");
        without_suffixes
            .replace(['<', '>'], "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ClassificationStrategy for RuleBasedClassifier {
    fn classify<'a>(&'a self, email: &'a Email) ->
        Pin<Box<dyn Future<Output = ClassificationOutcome> + Send + 'a>> {
        Box::pin(ready(ClassificationOutcome::Parsed(RuleBasedClassifier::classify(self, email))))
    }

    fn probe<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(ready(true))
    }

    fn strategy_name(&self) -> &str {
        "rule-based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn classifier() -> RuleBasedClassifier {
        RuleBasedClassifier::job_search().unwrap()
    }

    fn email(from: &str, subject: &str, body: &str) -> Email {
        Email::new("test", from, subject, body, Utc::now())
    }

    #[test]
    fn test_rejection_beats_interview() {
        let result = classifier().classify(&email(
            "hr@acme.io",
            "Your interview",
            "Thanks for interviewing with us. Unfortunately we went with other candidates.",
        ));
        assert_eq!(result.intent, Intent::Rejection);
        assert_eq!(result.extracted_data.status_change, Some(super::super::JobStatus::Rejected));
    }

    #[test]
    fn test_unknown_intent() {
        let result = classifier().classify(&email("news@shop.com", "Weekly deals", "Big sale this weekend"));
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(result.confidence, 0.1);
        assert!(result.extracted_data.is_empty());
    }

    #[test]
    fn test_confidence_scales_with_matches() {
        // 2 of 8 offer keywords: "offer", "salary"
        let result = classifier().classify(&email("a@b.com", "Hello", "Here is your offer and salary"));
        assert_eq!(result.intent, Intent::Offer);
        assert!((result.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_feedback_has_no_status_hint() {
        let result = classifier().classify(&email("a@b.com", "Quick note", "Sharing some feedback from the panel"));
        assert_eq!(result.intent, Intent::FeedbackReceived);
        assert_eq!(result.extracted_data.status_change, None);
    }

    #[test]
    fn test_company_from_known_domain() {
        let result = classifier().classify(&email("Careers <careers@Databricks.com>", "x", "y"));
        assert_eq!(result.company_name, "Databricks");
    }

    #[test]
    fn test_company_from_team_signature() {
        let result = classifier().classify(&email(
            "noreply@greenhouse.io",
            "Application update",
            "Thanks for applying.\n\nBest,\nAcme Robotics Recruiting Team",
        ));
        assert_eq!(result.company_name, "Acme Robotics");
    }

    #[test]
    fn test_company_from_interview_with() {
        let result = classifier().classify(&email(
            "scheduler@calendly.com",
            "Confirmed: interview with Initech",
            "see you then",
        ));
        assert_eq!(result.company_name, "Initech");
    }

    #[test]
    fn test_company_falls_back_to_domain() {
        let result = classifier().classify(&email("noreply@greenhouse.io", "update", "no names here"));
        assert_eq!(result.company_name, "greenhouse.io");
    }

    #[test]
    fn test_clean_company_name() {
        let c = classifier();
        assert_eq!(c.clean_company_name("Globex Corp"), "Globex");
        assert_eq!(c.clean_company_name("<Hooli Inc>"), "Hooli");
        assert_eq!(c.clean_company_name("Teamwork LLC"), "Teamwork");
        assert_eq!(c.clean_company_name("  Careers  "), "");
    }
}
