/// Common structures and utilities for job-related emails
use anyhow::{Result, Context};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use regex::Regex;
use serde::Serialize;

/// Email retrieved from Gmail (or the sample fixture set). Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub date: DateTime<Utc>,
}

impl Email {
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Email {
            id: id.into(),
            from: from.into(),
            subject: subject.into(),
            body: body.into(),
            date,
        }
    }

    /// Build an email from a raw RFC822 message
    pub fn from_raw(id: &str, raw: &[u8]) -> Result<Self> {
        let parsed = mail_parser::MessageParser::default()
            .parse(raw)
            .context("Unable to parse email")?;

        let date = if let Some(date_header) = parsed.date() {
            DateTime::from_timestamp(date_header.to_timestamp(), 0)
                .unwrap_or_else(Utc::now)
        } else {
            warn!("No date in email {}, using current date", id);
            Utc::now()
        };

        let from = parsed.from()
            .and_then(|addrs| addrs.first())
            .map(|addr| {
                match (&addr.name, &addr.address) {
                    (Some(name), Some(email)) => format!("{} <{}>", name, email),
                    (None, Some(email)) => email.to_string(),
                    _ => "Unknown sender".to_string(),
                }
            })
            .unwrap_or_else(|| "Unknown sender".to_string());

        let subject = parsed.subject()
            .unwrap_or("No subject")
            .to_string();

        // Prefer text/plain, then stripped text/html
        let mut body = String::new();
        if let Some(text_body) = parsed.body_text(0) {
            body.push_str(&text_body);
        }
        if body.is_empty() {
            if let Some(html_body) = parsed.body_html(0) {
                body = strip_html(&html_body);
            }
        }

        debug!("Parsed email {}: from={}, subject={}, {} body chars", id, from, subject, body.len());

        Ok(Email {
            id: id.to_string(),
            from,
            subject,
            body,
            date,
        })
    }

    /// Lowercased domain of the sender address (`""` if there is no `@`)
    pub fn sender_domain(&self) -> String {
        match self.from.split_once('@') {
            Some((_, rest)) => rest
                .trim_end_matches('>')
                .trim()
                .to_lowercase(),
            None => String::new(),
        }
    }
}

/// Crude HTML to text conversion for email bodies
pub fn strip_html(html: &str) -> String {
    let html_str = html
        .replace("<br>", "\n")
        .replace("<BR>", "\n")
        .replace("<br/>", "\n")
        .replace("</p>", "\n")
        .replace("</P>", "\n");

    match Regex::new(r"<[^>]+>") {
        Ok(tag_regex) => tag_regex.replace_all(&html_str, "").to_string(),
        Err(_) => html_str,
    }
}
