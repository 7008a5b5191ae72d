use anyhow::Context;
use log::{debug, error, info, warn};

use crate::classifier::throttle::{self, NoDelay, Throttle};
use crate::classifier::{
    Classification, ClassificationOutcome, ClassificationStrategy, FixedDelay, Intent, OllamaClassifier,
    RuleBasedClassifier,
};
use crate::config::Config;
use crate::email::Email;
use crate::error::PipelineError;
use crate::metadata_extractor::{self, EmailMetadata};
use crate::status_update::{AssumeApplied, PriorStatusSource, StatusUpdate};

use super::summary::ProcessingSummary;
use super::LlmFallback;

/// Per-email record of a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEmail {
    pub email_id: String,
    pub sender: String,
    pub subject: String,
    /// `None` when the email failed
    pub classification: Option<Classification>,
    pub processed: bool,
}

/// Everything a batch produced, in input order
#[derive(Debug, Clone, Default)]
pub struct ProcessingRun {
    pub records: Vec<ClassifiedEmail>,
    pub status_updates: Vec<StatusUpdate>,
}

impl ProcessingRun {
    pub fn summary(&self) -> ProcessingSummary {
        ProcessingSummary::from_records(&self.records)
    }
}

pub struct EmailProcessor {
    rules: RuleBasedClassifier,
    llm: Option<Box<dyn ClassificationStrategy>>,
    throttle: Box<dyn Throttle>,
    prior_status: Box<dyn PriorStatusSource>,
    fallback: LlmFallback,
}

impl EmailProcessor {
    /// Rule-based processor with no throttling and APPLIED prior status
    pub fn new(rules: RuleBasedClassifier) -> Self {
        EmailProcessor {
            rules,
            llm: None,
            throttle: Box::new(NoDelay),
            prior_status: Box::new(AssumeApplied),
            fallback: LlmFallback::default(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let rules = RuleBasedClassifier::job_search()
            .context("Unable to compile the job-search taxonomy")?;

        let mut processor = EmailProcessor::new(rules).with_fallback(config.ollama.fallback);

        if config.ollama.enabled {
            let ollama = OllamaClassifier::from_config(&config.ollama)
                .context("Unable to initialize Ollama classifier")?;
            info!("🤖 Ollama classification enabled ({} at {})", config.ollama.model, config.ollama.url);

            processor = processor
                .with_llm(ollama)
                .with_throttle(FixedDelay::from_millis(config.ollama.delay_ms));
        } else {
            info!("ℹ️  Ollama disabled - using rule-based classifier");
        }

        Ok(processor)
    }

    pub fn with_llm<S: ClassificationStrategy + 'static>(mut self, llm: S) -> Self {
        self.llm = Some(Box::new(llm));
        self
    }

    pub fn with_throttle<T: Throttle + 'static>(mut self, throttle: T) -> Self {
        self.throttle = Box::new(throttle);
        self
    }

    pub fn with_prior_status<P: PriorStatusSource + 'static>(mut self, prior_status: P) -> Self {
        self.prior_status = Box::new(prior_status);
        self
    }

    pub fn with_fallback(mut self, fallback: LlmFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Name of the classifier that will handle the next email
    pub fn active_strategy_name(&self) -> &str {
        match &self.llm {
            Some(llm) => llm.strategy_name(),
            None => "rule-based",
        }
    }

    /// Classify a batch in input order and synthesize status updates.
    ///
    /// The LLM backend is probed once up front; if the probe fails the
    /// rule-based classifier handles the rest of this processor's batches.
    pub async fn process_emails(
        &mut self,
        emails: &[Email],
        confidence_threshold: f64,
    ) -> Result<ProcessingRun, PipelineError> {
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(PipelineError::InvalidThreshold(confidence_threshold));
        }
        if emails.is_empty() {
            return Err(PipelineError::NoEmails);
        }

        info!("Processing {} emails for job status updates", emails.len());

        let llm_available = match &self.llm {
            Some(llm) => llm.probe().await,
            None => true,
        };
        if llm_available {
            info!("✅ Using {} classifier", self.active_strategy_name());
        } else {
            warn!("⚠️  {} not available, falling back to rule-based classifier", self.active_strategy_name());
            self.llm = None;
        }

        let mut run = ProcessingRun::default();

        for (index, email) in emails.iter().enumerate() {
            let mut record = ClassifiedEmail {
                email_id: email.id.clone(),
                sender: email.from.clone(),
                subject: email.subject.clone(),
                classification: None,
                processed: false,
            };

            match self.classify_email(email, index).await {
                Ok(classification) => {
                    let metadata = metadata_extractor::extract_all(email);
                    let classification = enrich(classification, &metadata);

                    debug!(
                        "Email from {} classified as {} with {}% confidence",
                        email.from, classification.intent, classification.confidence_percent()
                    );

                    if let Some(update) = self.build_status_update(email, &classification, &metadata, confidence_threshold) {
                        run.status_updates.push(update);
                    }

                    record.classification = Some(classification);
                    record.processed = true;
                }
                Err(e) => {
                    error!("Error processing email {}: {}", email.id, e);
                }
            }

            run.records.push(record);
        }

        info!("Generated {} status updates from {} emails", run.status_updates.len(), emails.len());

        Ok(run)
    }

    async fn classify_email(&self, email: &Email, index: usize) -> Result<Classification, PipelineError> {
        let llm = match &self.llm {
            Some(llm) => llm,
            None => return Ok(self.rules.classify(email)),
        };

        let outcome = llm.classify(email).await;
        throttle::pause(self.throttle.as_ref(), index).await;

        let reason = match outcome {
            ClassificationOutcome::Parsed(classification) => return Ok(classification),
            ClassificationOutcome::ParseFailure { reason, .. } => reason,
            ClassificationOutcome::TransportFailure(e) => e.to_string(),
        };

        match self.fallback {
            LlmFallback::FixedUnknown => {
                debug!("Using UNKNOWN fallback for email {}: {}", email.id, reason);
                Ok(Classification::unknown())
            }
            LlmFallback::RuleBased => {
                warn!("Falling back to rule-based classification for email {}: {}", email.id, reason);
                Ok(self.rules.classify(email))
            }
            LlmFallback::Skip => Err(PipelineError::ClassificationUnavailable {
                email_id: email.id.clone(),
                reason,
            }),
        }
    }

    fn build_status_update(
        &self,
        email: &Email,
        classification: &Classification,
        metadata: &EmailMetadata,
        confidence_threshold: f64,
    ) -> Option<StatusUpdate> {
        if classification.confidence < confidence_threshold || !classification.intent.is_actionable() {
            debug!(
                "Skipping email {}: confidence {} below threshold {} or non-actionable intent {}",
                email.id, classification.confidence, confidence_threshold, classification.intent
            );
            return None;
        }

        if classification.company_name.trim().is_empty() {
            warn!("No company name extracted from email {}, skipping status update", email.id);
            return None;
        }

        let new_status = classification.intent.tracker_status()?;
        let job_title = metadata.job_title.clone()
            .or_else(|| classification.extracted_data.job_title.clone());
        let old_status = self.prior_status.prior_status(&classification.company_name, job_title.as_deref());

        Some(StatusUpdate {
            company_name: classification.company_name.clone(),
            job_title,
            old_status,
            new_status,
            reason: update_reason(classification.intent, &email.subject),
            confidence: classification.confidence,
            email_id: email.id.clone(),
        })
    }
}

/// Fill extracted fields the classifier left empty. UNKNOWN stays bare.
fn enrich(classification: Classification, metadata: &EmailMetadata) -> Classification {
    if !classification.intent.is_actionable() {
        return classification;
    }

    let mut extracted = classification.extracted_data.clone();
    if extracted.job_title.is_none() {
        extracted.job_title = metadata.job_title.clone();
    }
    if extracted.interview_date.is_none() {
        extracted.interview_date = metadata.interview_date.clone();
    }
    if extracted.action_required.is_none() {
        extracted.action_required = metadata.action_items.first().cloned();
    }

    Classification {
        extracted_data: extracted,
        ..classification
    }
}

fn update_reason(intent: Intent, subject: &str) -> String {
    match intent {
        Intent::InterviewScheduled => format!("Interview scheduled - detected from email: \"{}\"", subject),
        Intent::Rejection => format!("Application rejected - detected from email: \"{}\"", subject),
        Intent::Offer => format!("Job offer received - detected from email: \"{}\"", subject),
        Intent::FeedbackReceived => format!("Interview feedback received - detected from email: \"{}\"", subject),
        _ => format!("Status update based on email: \"{}\"", subject),
    }
}
