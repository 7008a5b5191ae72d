use std::collections::HashMap;

use super::Intent;

/// Keyword indicators for one intent
#[derive(Debug, Clone)]
pub struct IntentKeywords {
    pub intent: Intent,
    pub keywords: Vec<String>,
}

/// Immutable keyword and company lookup data for the rule-based classifier.
///
/// `intents` is evaluated in order and the first intent with a matching
/// keyword wins, so the order is the priority order.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub intents: Vec<IntentKeywords>,
    /// Sender domain -> company display name
    pub known_domains: HashMap<String, String>,
    /// Regexes whose first capture group is a company name candidate
    pub company_patterns: Vec<String>,
    /// Whole words stripped from extracted company names
    pub organizational_suffixes: Vec<String>,
}

const REJECTION_KEYWORDS: &[&str] = &[
    "not moving forward",
    "not be moving forward",
    "not to move forward",
    "not selected",
    "rejected",
    "unfortunately",
    "different direction",
    "other candidates",
    "decline",
    "regret to inform",
    "not a fit",
    "decided not to proceed",
];

const OFFER_KEYWORDS: &[&str] = &[
    "offer",
    "congratulations",
    "pleased to offer",
    "extend an offer",
    "compensation package",
    "start date",
    "salary",
    "benefits",
];

const INTERVIEW_KEYWORDS: &[&str] = &[
    "interview",
    "scheduled",
    "calendar",
    "meeting",
    "zoom",
    "teams",
    "available",
    "availability",
    "time slot",
    "phone screen",
    "video call",
];

const FEEDBACK_KEYWORDS: &[&str] = &[
    "feedback",
    "next steps",
    "following up",
    "update on your application",
    "interview feedback",
    "next round",
    "additional interview",
];

const KNOWN_DOMAINS: &[(&str, &str)] = &[
    ("google.com", "Google"),
    ("microsoft.com", "Microsoft"),
    ("amazon.com", "Amazon"),
    ("facebook.com", "Meta"),
    ("meta.com", "Meta"),
    ("netflix.com", "Netflix"),
    ("uber.com", "Uber"),
    ("airbnb.com", "Airbnb"),
    ("stripe.com", "Stripe"),
    ("github.com", "GitHub"),
    ("gitlab.com", "GitLab"),
    ("spotify.com", "Spotify"),
    ("twitter.com", "X (Twitter)"),
    ("linkedin.com", "LinkedIn"),
    ("salesforce.com", "Salesforce"),
    ("oracle.com", "Oracle"),
    ("adobe.com", "Adobe"),
    ("tesla.com", "Tesla"),
    ("apple.com", "Apple"),
    ("databricks.com", "Databricks"),
    ("snowflake.com", "Snowflake"),
    ("robinhood.com", "Robinhood"),
    ("coinbase.com", "Coinbase"),
    ("palantir.com", "Palantir"),
    ("figma.com", "Figma"),
    ("notion.so", "Notion"),
    ("discord.com", "Discord"),
    ("roblox.com", "Roblox"),
];

// Capitalised word runs are matched case-sensitively; the anchor words are not.
const COMPANY_PATTERNS: &[&str] = &[
    r"(?i)from.*@([a-z0-9-]+)\.",
    r"\b([A-Z][a-zA-Z&.\-]*(?:[ \t]+[A-Z][a-zA-Z&.\-]*)*)\s+(?i:team|recruiting|careers|hr)\b",
    r"(?i:interview\s+with)\s+([A-Z][a-zA-Z&.\-]*(?:[ \t]+[A-Z][a-zA-Z&.\-]*)*)",
];

const ORGANIZATIONAL_SUFFIXES: &[&str] = &[
    "team", "recruiting", "careers", "hr", "inc", "llc", "corp", "ltd",
];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Taxonomy {
    /// Job-search taxonomy: rejection, offer, interview, feedback in that order
    pub fn job_search() -> Self {
        Taxonomy {
            intents: vec![
                IntentKeywords { intent: Intent::Rejection, keywords: owned(REJECTION_KEYWORDS) },
                IntentKeywords { intent: Intent::Offer, keywords: owned(OFFER_KEYWORDS) },
                IntentKeywords { intent: Intent::InterviewScheduled, keywords: owned(INTERVIEW_KEYWORDS) },
                IntentKeywords { intent: Intent::FeedbackReceived, keywords: owned(FEEDBACK_KEYWORDS) },
            ],
            known_domains: KNOWN_DOMAINS
                .iter()
                .map(|(domain, company)| (domain.to_string(), company.to_string()))
                .collect(),
            company_patterns: owned(COMPANY_PATTERNS),
            organizational_suffixes: owned(ORGANIZATIONAL_SUFFIXES),
        }
    }

    pub fn keywords_for(&self, intent: Intent) -> &[String] {
        self.intents
            .iter()
            .find(|set| set.intent == intent)
            .map(|set| set.keywords.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::job_search()
    }
}
