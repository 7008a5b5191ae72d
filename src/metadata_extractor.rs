use chrono::NaiveDate;
use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::date_utils::format_date;
use crate::email::Email;

/// Auxiliary fields pulled out of a job-related email
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmailMetadata {
    pub job_title: Option<String>,
    /// Normalized `YYYY-MM-DD`
    pub interview_date: Option<String>,
    pub action_items: Vec<String>,
    pub job_url: Option<String>,
    pub company: CompanyDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyDetails {
    pub size: Option<String>,
    pub industry: Option<String>,
}

// Up to four capitalized words ending in a role noun
const TITLE: &str = r"((?:[A-Z][a-zA-Z-]*\s+){0,4}(?:Engineer|Developer|Manager|Analyst|Scientist|Designer))";

const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    ("technology", &["tech", "software", "ai", "machine learning", "cloud", "saas"]),
    ("finance", &["fintech", "banking", "trading", "cryptocurrency", "payments"]),
    ("healthcare", &["health", "medical", "biotech", "pharmaceutical"]),
    ("ecommerce", &["e-commerce", "marketplace", "retail", "shopping"]),
    ("media", &["media", "entertainment", "streaming", "social"]),
    ("automotive", &["automotive", "transportation", "mobility", "vehicle"]),
    ("gaming", &["gaming", "game", "esports"]),
];

const SIZE_KEYWORDS: &[(&str, &[&str])] = &[
    ("startup", &["startup", "early stage", "seed", "series a"]),
    ("medium", &["growing", "expanding", "scale-up"]),
    ("large", &["enterprise", "fortune 500", "global", "multinational"]),
];

const SHORT_TOKEN_LEN: usize = 2;

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    "mon", "tue", "tues", "wed", "thu", "thur", "thurs", "fri", "sat", "sun",
];

/// Run every extractor over `email`
pub fn extract_all(email: &Email) -> EmailMetadata {
    let metadata = EmailMetadata {
        job_title: extract_job_title(email),
        interview_date: extract_interview_date(email),
        action_items: extract_action_items(email),
        job_url: extract_job_url(email),
        company: extract_company_details(email),
    };

    debug!("Metadata for email {}: {:?}", email.id, metadata);
    metadata
}

/// Job title from subject and body
/// Patterns: "position for Backend Engineer", "Data Scientist role",
/// "for the Senior Software Engineer", "Re: Product Manager"
pub fn extract_job_title(email: &Email) -> Option<String> {
    let text = format!("{} {}", email.subject, email.body);

    let patterns = [
        format!(r"(?i:position|role|job)(?:\s+(?i:for|as)|\s*:)\s+{}", TITLE),
        format!(r"{}\s+(?i:position|role|job)\b", TITLE),
        format!(r"(?i:for\s+the)\s+{}", TITLE),
        format!(r"(?i:re:)\s+{}", TITLE),
    ];

    for pattern in &patterns {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(title) = re.captures(&text).and_then(|caps| caps.get(1)) {
                let title = title.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
                debug!("Found job title: {}", title);
                return Some(title);
            }
        }
    }

    None
}

/// First interview date literal in the body that is a real calendar date
/// Shapes, in order: "on Monday, July 8th, 2025", "7/8/2025", "2025-07-08", "July 8, 2025"
pub fn extract_interview_date(email: &Email) -> Option<String> {
    let patterns = [
        r"(?i)(?:on|for)\s+([a-z]+,?\s+[a-z]+\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4})",
        r"(\d{1,2}/\d{1,2}/\d{4})",
        r"(\d{4}-\d{2}-\d{2})",
        r"(?i)([a-z]+\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4})",
    ];

    for pattern in &patterns {
        if let Ok(re) = Regex::new(pattern) {
            for caps in re.captures_iter(&email.body) {
                let Some(literal) = caps.get(1) else { continue };
                match parse_date_literal(literal.as_str()) {
                    Some(date) => return Some(format_date(date)),
                    None => debug!("Skipping unparseable date: {}", literal.as_str()),
                }
            }
        }
    }

    None
}

/// Parse a human date literal into a calendar date.
/// Commas, ordinal suffixes and a leading weekday are ignored.
pub fn parse_date_literal(literal: &str) -> Option<NaiveDate> {
    let cleaned = literal.replace(',', " ");
    let mut tokens: Vec<String> = cleaned
        .split_whitespace()
        .map(strip_ordinal)
        .collect();

    if tokens.len() > 3 || tokens.first().is_some_and(|t| WEEKDAYS.contains(&t.to_lowercase().as_str())) {
        tokens.remove(0);
    }
    let normalized = tokens.join(" ");

    ["%Y-%m-%d", "%m/%d/%Y", "%B %d %Y", "%b %d %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
}

fn strip_ordinal(token: &str) -> String {
    let lower = token.to_lowercase();
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(number) = lower.strip_suffix(suffix) {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return number.to_string();
            }
        }
    }
    token.to_string()
}

/// Every imperative phrase in the body, in pattern order, lowercased as found
pub fn extract_action_items(email: &Email) -> Vec<String> {
    let text = email.body.to_lowercase();
    let mut actions = Vec::new();

    let patterns = [
        r"please\s+(?:respond|reply|confirm|let\s+us\s+know)",
        r"we\s+would\s+like\s+to\s+(?:schedule|arrange|set\s+up)",
        r"could\s+you\s+(?:please\s+)?(?:provide|send|confirm)",
        r"please\s+(?:review|complete|fill\s+out)",
        r"next\s+steps?",
        r"follow\s+up",
    ];

    for pattern in &patterns {
        if let Ok(re) = Regex::new(pattern) {
            actions.extend(re.find_iter(&text).map(|m| m.as_str().to_string()));
        }
    }

    actions
}

/// Link to the posting or application portal
pub fn extract_job_url(email: &Email) -> Option<String> {
    let patterns = [
        r"(?i)https?://\S+(?:jobs|careers|apply|greenhouse|lever|workday|ashby)\S*",
        r"(?i)https?://\S*\.(?:com|org|net)/\S*(?:job|career|position)\S*",
    ];

    for pattern in &patterns {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(m) = re.find(&email.body) {
                let url = m.as_str().trim_end_matches(['.', ',', ';', ')', '>']);
                return Some(url.to_string());
            }
        }
    }

    None
}

/// Company size and industry, first keyword group by declaration order
pub fn extract_company_details(email: &Email) -> CompanyDetails {
    let text = email.body.to_lowercase();

    CompanyDetails {
        size: first_group_match(&text, SIZE_KEYWORDS),
        industry: first_group_match(&text, INDUSTRY_KEYWORDS),
    }
}

fn first_group_match(text: &str, groups: &[(&str, &[&str])]) -> Option<String> {
    groups.iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| mentions(text, keyword)))
        .map(|(label, _)| label.to_string())
}

/// Substring match, except tokens of two letters or fewer must be whole words
fn mentions(text: &str, keyword: &str) -> bool {
    if keyword.len() > SHORT_TOKEN_LEN {
        return text.contains(keyword);
    }
    text.split(|c: char| !c.is_alphanumeric()).any(|word| word == keyword)
}
