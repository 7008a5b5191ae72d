//! Ollama-backed email classifier
//!
//! Sends a structured prompt to a local Ollama instance (`/api/generate`)
//! and decodes the constrained JSON answer into a [`Classification`].
//!
//! Failures are reported as a [`ClassificationOutcome`] so the caller can
//! decide the fallback; [`OllamaClassifier::classify`] applies the fixed
//! UNKNOWN fallback itself.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::throttle::{self, Throttle};
use super::{Classification, ClassificationOutcome, ClassificationStrategy, ExtractedData, Intent, JobStatus};
use crate::config::OllamaConfig;
use crate::date_utils;
use crate::email::Email;
use crate::error::LlmError;
use crate::metadata_extractor;

/// Default timeout for generate requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Body characters embedded in the prompt
pub const MAX_PROMPT_BODY_CHARS: usize = 1000;

const TEMPERATURE: f64 = 0.1;
const CONTEXT_WINDOW: u32 = 4096;

pub struct OllamaClassifier {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_ctx: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaClassifier {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Unable to build HTTP client: {}", e)))?;

        let base_url: String = base_url.into();

        Ok(OllamaClassifier {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            timeout,
        })
    }

    pub fn from_config(config: &OllamaConfig) -> Result<Self, LlmError> {
        Self::new(&config.url, &config.model, Duration::from_secs(config.timeout_secs))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_prompt(email: &Email) -> String {
        let body: String = email.body.chars().take(MAX_PROMPT_BODY_CHARS).collect();

        format!(
            r#"You are an expert email classifier for job applications. Analyze this email and classify its intent.

Email Details:
- From: {from}
- Subject: {subject}
- Body: {body}

Classification Options:
1. INTERVIEW_SCHEDULED - Email scheduling an interview or coding challenge
2. REJECTION - Email declining/rejecting the application
3. OFFER - Email with a job offer or offer-related content
4. FEEDBACK_RECEIVED - Email with interview feedback or next steps
5. UNKNOWN - Email not related to job application status

Additional Analysis:
- Extract the company name
- Estimate confidence (0.0 to 1.0)
- If interview/offer, extract any relevant details

Response Format (JSON only):
{{
  "intent": "INTERVIEW_SCHEDULED",
  "companyName": "Google",
  "confidence": 0.95,
  "extractedData": {{
    "jobTitle": "Senior Software Engineer",
    "interviewDate": "2025-07-10",
    "statusChange": "INTERVIEWING",
    "actionRequired": "Confirm availability"
  }}
}}

Respond with only the JSON object, no other text.
"#,
            from = email.from,
            subject = email.subject,
            body = body,
        )
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }

    /// Raw completion text for `prompt`
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);

        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: TEMPERATURE,
                num_ctx: CONTEXT_WINDOW,
            },
        };

        debug!("Prompt sent to {}:\n{}", self.model, prompt);

        let response = self.client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(LlmError::ModelNotAvailable(self.model.clone()));
            }
            let body = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let generated = response.json::<GenerateResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to decode generate response: {}", e)))?;

        debug!("Model response:\n{}", generated.response);

        Ok(generated.response)
    }

    /// Classify one email, keeping failure kinds apart
    pub async fn classify_detailed(&self, email: &Email) -> ClassificationOutcome {
        let prompt = Self::build_prompt(email);

        let raw = match self.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Ollama request failed for email {}: {}", email.id, e);
                return ClassificationOutcome::TransportFailure(e);
            }
        };

        match parse_classification_response(&raw) {
            Ok(classification) => {
                debug!(
                    "Ollama classified email {}: {} ({}%)",
                    email.id, classification.intent, classification.confidence_percent()
                );
                ClassificationOutcome::Parsed(classification)
            }
            Err(reason) => {
                warn!("Unusable Ollama response for email {}: {}", email.id, reason);
                ClassificationOutcome::ParseFailure { raw, reason }
            }
        }
    }

    /// Classify one email, falling back to UNKNOWN/0.1 on any failure
    pub async fn classify(&self, email: &Email) -> Classification {
        self.classify_detailed(email).await.into_classification()
    }

    /// Check the service is reachable and serves the configured model family
    pub async fn test_connection(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to connect to Ollama at {}: {}", self.base_url, e);
                return false;
            }
        };

        if !response.status().is_success() {
            warn!("Ollama tags endpoint answered HTTP {}", response.status());
            return false;
        }

        let tags = match response.json::<TagsResponse>().await {
            Ok(tags) => tags,
            Err(e) => {
                warn!("Unable to decode Ollama model list: {}", e);
                return false;
            }
        };

        let family = self.model.split(':').next().unwrap_or(&self.model);
        let available: Vec<&str> = tags.models.iter().map(|m| m.name.as_str()).collect();

        if !available.iter().any(|name| name.contains(family)) {
            warn!("Model {} not found. Available models: {:?}", self.model, available);
            return false;
        }

        info!("✅ Ollama connection successful. Model {} is available.", self.model);
        true
    }

    /// Classify emails one after another, pausing between calls
    pub async fn classify_batch(&self, emails: &[Email], throttle: &dyn Throttle) -> Vec<Classification> {
        let mut results = Vec::with_capacity(emails.len());

        for (index, email) in emails.iter().enumerate() {
            info!("Classifying email {}/{} with Ollama...", index + 1, emails.len());
            results.push(self.classify(email).await);
            throttle::pause(throttle, index).await;
        }

        results
    }
}

impl ClassificationStrategy for OllamaClassifier {
    fn classify<'a>(&'a self, email: &'a Email) ->
        Pin<Box<dyn Future<Output = ClassificationOutcome> + Send + 'a>> {
        Box::pin(self.classify_detailed(email))
    }

    fn probe<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(self.test_connection())
    }

    fn strategy_name(&self) -> &str {
        "ollama"
    }
}

/// First JSON object in `response`, tolerating prose around it
fn extract_json_object(response: &str) -> Option<Value> {
    let start = response.find('{')?;
    let candidate = &response[start..];

    let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
    if let Some(Ok(value)) = stream.next() {
        return Some(value);
    }

    // Greedy retry: first '{' to last '}'
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&response[start..=end]).ok()
}

fn optional_string(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_extracted_data(value: &Value) -> ExtractedData {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return ExtractedData::default(),
    };

    ExtractedData {
        job_title: optional_string(obj, "jobTitle"),
        interview_date: optional_string(obj, "interviewDate")
            .and_then(|date| metadata_extractor::parse_date_literal(&date))
            .map(date_utils::format_date),
        status_change: optional_string(obj, "statusChange")
            .and_then(|status| JobStatus::from_label(&status)),
        action_required: optional_string(obj, "actionRequired"),
    }
}

/// Decode a model answer into a classification.
///
/// Requires `intent` (string), `companyName` (string) and a numeric
/// `confidence`. Unrecognised intents become UNKNOWN and the confidence
/// is clamped into [0, 1].
pub fn parse_classification_response(response: &str) -> Result<Classification, String> {
    let json = extract_json_object(response)
        .ok_or_else(|| "No JSON object found in response".to_string())?;

    let obj = json.as_object()
        .ok_or_else(|| "Response JSON is not an object".to_string())?;

    let intent_label = obj.get("intent")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "Missing or invalid 'intent'".to_string())?;

    let company_name = obj.get("companyName")
        .and_then(Value::as_str)
        .ok_or_else(|| "Missing or invalid 'companyName'".to_string())?;

    let confidence = obj.get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| "Missing or non-numeric 'confidence'".to_string())?;

    let intent = Intent::from_label(intent_label);
    if intent == Intent::Unknown && intent_label.trim() != "UNKNOWN" {
        debug!("Unrecognised intent label '{}', using UNKNOWN", intent_label);
    }

    let extracted_data = obj.get("extractedData")
        .map(parse_extracted_data)
        .unwrap_or_default();

    Ok(Classification::new(intent, company_name.trim(), confidence, extracted_data))
}
