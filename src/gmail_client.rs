use anyhow::{Result, Context};
use chrono::{NaiveDate, Utc};
use google_gmail1::{Gmail, hyper, hyper_rustls, oauth2};
use log::{info, debug, warn};

use crate::config::GmailConfig;
use crate::date_utils;
use crate::email::Email;

/// Search terms for job-related mail
pub const JOB_SEARCH_KEYWORDS: &[&str] = &[
    "interview",
    "application",
    "feedback",
    "availability",
    "position",
    "job",
    "offer",
    "rejection",
    "thank you for your interest",
    "next steps",
    "coding challenge",
    "technical interview",
    "recruiter",
    "hiring",
    "opportunity",
];

/// `(kw OR "multi word" OR ...) after:YYYY/MM/DD -in:spam -in:trash`
pub fn build_search_query(keywords: &[&str], days_back: u32, today: NaiveDate) -> String {
    let terms = keywords
        .iter()
        .map(|keyword| {
            if keyword.contains(char::is_whitespace) {
                format!("\"{}\"", keyword)
            } else {
                keyword.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" OR ");

    format!(
        "({}) after:{} -in:spam -in:trash",
        terms,
        date_utils::gmail_after_date(today, days_back)
    )
}

pub struct GmailClient {
    hub: Gmail<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
    max_results: u32,
}

impl GmailClient {
    pub async fn new(config: &GmailConfig) -> Result<Self> {
        info!("Connecting to Gmail API via OAuth2");

        let secret = oauth2::read_application_secret(&config.credentials_path)
            .await
            .context("Unable to read OAuth2 client credentials file")?;

        // Tokens are cached so the browser consent only happens once
        let auth = oauth2::InstalledFlowAuthenticator::builder(
            secret,
            oauth2::InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(&config.token_cache_path)
        .build()
        .await
        .context("Unable to create OAuth2 authenticator")?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .build();

        let client = hyper::Client::builder().build(connector);
        let hub = Gmail::new(client, auth);

        info!("✅ Gmail API connection established successfully");

        Ok(GmailClient {
            hub,
            max_results: config.max_results,
        })
    }

    /// IDs of job-related messages received in the last `days_back` days
    pub async fn search_job_emails(&self, days_back: u32) -> Result<Vec<String>> {
        let query = build_search_query(JOB_SEARCH_KEYWORDS, days_back, Utc::now().date_naive());
        info!("Searching for job-related emails from the last {} days", days_back);
        debug!("Search criteria: {}", query);

        let result = self.hub
            .users()
            .messages_list("me")
            .q(&query)
            .max_results(self.max_results)
            .add_scope(google_gmail1::api::Scope::Readonly)
            .doit()
            .await
            .context("Error searching for job-related emails")?;

        let message_ids: Vec<String> = result.1
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|msg| msg.id)
            .collect();

        info!("Found {} potential job-related email(s)", message_ids.len());

        Ok(message_ids)
    }

    pub async fn fetch_email(&self, message_id: &str) -> Result<Email> {
        debug!("Retrieving email {}", message_id);

        let (_, message) = self.hub
            .users()
            .messages_get("me", message_id)
            .format("raw")
            .add_scope(google_gmail1::api::Scope::Readonly)
            .doit()
            .await
            .with_context(|| format!("Unable to retrieve email {}", message_id))?;

        // Already decoded RFC822 bytes
        let raw = message.raw
            .context("No raw content in email")?;

        debug!("Email {} retrieved, size: {} bytes", message_id, raw.len());

        Email::from_raw(message_id, &raw)
    }

    /// Search then fetch. Messages that fail to download or parse are skipped.
    pub async fn fetch_job_emails(&self, days_back: u32) -> Result<Vec<Email>> {
        let message_ids = self.search_job_emails(days_back).await?;
        let mut emails = Vec::with_capacity(message_ids.len());

        for message_id in &message_ids {
            match self.fetch_email(message_id).await {
                Ok(email) => emails.push(email),
                Err(e) => warn!("Failed to fetch email {}: {:#}", message_id, e),
            }
        }

        info!("Retrieved {}/{} job-related email(s)", emails.len(), message_ids.len());
        Ok(emails)
    }
}
