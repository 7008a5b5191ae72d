use std::future::{ready, Future};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jobmail::classifier::{
    Classification, ClassificationOutcome, ClassificationStrategy, ExtractedData, Intent, JobStatus,
    RuleBasedClassifier, Throttle,
};
use jobmail::email::{sample_emails, Email};
use jobmail::error::{LlmError, PipelineError};
use jobmail::pipeline::{EmailProcessor, LlmFallback};
use jobmail::status_update::PriorStatusSource;

type Responder = Box<dyn Fn(&Email) -> ClassificationOutcome + Send + Sync>;

/// Scripted classification backend
struct FakeBackend {
    available: bool,
    calls: Arc<AtomicUsize>,
    respond: Responder,
}

impl FakeBackend {
    fn new(available: bool, respond: Responder) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = FakeBackend {
            available,
            calls: Arc::clone(&calls),
            respond,
        };
        (backend, calls)
    }
}

impl ClassificationStrategy for FakeBackend {
    fn classify<'a>(&'a self, email: &'a Email) ->
        Pin<Box<dyn Future<Output = ClassificationOutcome> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(ready((self.respond)(email)))
    }

    fn probe<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(ready(self.available))
    }

    fn strategy_name(&self) -> &str {
        "fake"
    }
}

/// Records how often the processor asked for a delay
struct CountingThrottle(Arc<AtomicUsize>);

impl Throttle for CountingThrottle {
    fn delay_after(&self, _call_index: usize) -> Duration {
        self.0.fetch_add(1, Ordering::SeqCst);
        Duration::ZERO
    }
}

struct AlwaysScreening;

impl PriorStatusSource for AlwaysScreening {
    fn prior_status(&self, _company_name: &str, _job_title: Option<&str>) -> JobStatus {
        JobStatus::Screening
    }
}

fn rules() -> RuleBasedClassifier {
    RuleBasedClassifier::job_search().unwrap()
}

fn email(id: &str, from: &str, subject: &str, body: &str) -> Email {
    Email::new(id, from, subject, body, Utc::now())
}

fn transport_failure() -> Responder {
    Box::new(|_: &Email| ClassificationOutcome::TransportFailure(LlmError::Status {
        status: 500,
        body: "boom".to_string(),
    }))
}

#[tokio::test]
async fn test_rejects_invalid_threshold_and_empty_batch() {
    let mut processor = EmailProcessor::new(rules());

    let err = processor.process_emails(&sample_emails(), 1.5).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidThreshold(t) if t == 1.5));

    let err = processor.process_emails(&sample_emails(), f64::NAN).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidThreshold(_)));

    let err = processor.process_emails(&[], 0.7).await.unwrap_err();
    assert!(matches!(err, PipelineError::NoEmails));
}

#[tokio::test]
async fn test_threshold_gates_updates() {
    // offer + salary: 2 of 8 offer keywords, confidence 0.6
    let offer = email("1", "careers@databricks.com", "Hello", "Your offer and salary details");
    let mut processor = EmailProcessor::new(rules());

    let run = processor.process_emails(&[offer.clone()], 0.9).await.unwrap();
    assert!(run.status_updates.is_empty());
    assert!(run.records[0].processed);

    let run = processor.process_emails(&[offer], 0.6).await.unwrap();
    assert_eq!(run.status_updates.len(), 1);
}

#[tokio::test]
async fn test_sample_batch_with_rule_based_classifier() {
    let mut processor = EmailProcessor::new(rules());
    let run = processor.process_emails(&sample_emails(), 0.6).await.unwrap();

    assert_eq!(run.records.len(), 6);
    assert!(run.records.iter().all(|r| r.processed));

    let updates: Vec<(&str, JobStatus)> = run.status_updates
        .iter()
        .map(|u| (u.company_name.as_str(), u.new_status))
        .collect();
    assert_eq!(updates, vec![("Stripe", JobStatus::Interviewing), ("Databricks", JobStatus::Offered)]);

    let stripe = &run.status_updates[0];
    assert_eq!(stripe.job_title.as_deref(), Some("Frontend Engineer"));
    assert_eq!(stripe.email_id, "1234567890");
    assert_eq!(
        stripe.reason,
        "Interview scheduled - detected from email: \"Interview scheduled - Frontend Engineer position\""
    );

    let databricks = &run.status_updates[1];
    assert_eq!(databricks.job_title.as_deref(), Some("Senior Software Engineer"));
}

#[tokio::test]
async fn test_summary_over_sample_batch() {
    let mut processor = EmailProcessor::new(rules());
    let run = processor.process_emails(&sample_emails(), 0.7).await.unwrap();
    let summary = run.summary();

    assert_eq!(summary.total, 6);
    assert_eq!(summary.processed, 6);
    assert_eq!(summary.by_intent.get(&Intent::InterviewScheduled), Some(&3));
    assert_eq!(summary.by_intent.get(&Intent::Rejection), Some(&2));
    assert_eq!(summary.by_intent.get(&Intent::Offer), Some(&1));
    assert_eq!(summary.by_company.len(), 6);
    assert!(summary.avg_confidence > 0.5 && summary.avg_confidence < 0.95);
}

#[tokio::test]
async fn test_failed_probe_switches_to_rules_for_whole_batch() {
    let (backend, calls) = FakeBackend::new(false, transport_failure());
    let mut processor = EmailProcessor::new(rules()).with_llm(backend);
    assert_eq!(processor.active_strategy_name(), "fake");

    let run = processor.process_emails(&sample_emails(), 0.6).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(processor.active_strategy_name(), "rule-based");
    assert_eq!(run.status_updates.len(), 2);
}

#[tokio::test]
async fn test_llm_classification_drives_updates() {
    let (backend, calls) = FakeBackend::new(true, Box::new(|email: &Email| {
        ClassificationOutcome::Parsed(Classification::new(
            Intent::FeedbackReceived,
            "Initech",
            0.85,
            ExtractedData {
                job_title: Some(format!("Role for {}", email.id)),
                ..ExtractedData::default()
            },
        ))
    }));
    let throttled = Arc::new(AtomicUsize::new(0));

    let mut processor = EmailProcessor::new(rules())
        .with_llm(backend)
        .with_throttle(CountingThrottle(Arc::clone(&throttled)))
        .with_prior_status(AlwaysScreening);

    let emails = vec![
        email("a", "someone@initech.com", "Next steps", "Please confirm your availability on 2025-09-01."),
        email("b", "someone@initech.com", "Update", "Nothing else"),
    ];
    let run = processor.process_emails(&emails, 0.7).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(throttled.load(Ordering::SeqCst), 2);
    assert_eq!(run.status_updates.len(), 2);

    let update = &run.status_updates[0];
    assert_eq!(update.company_name, "Initech");
    assert_eq!(update.old_status, JobStatus::Screening);
    assert_eq!(update.new_status, JobStatus::Interviewing);
    assert_eq!(update.job_title.as_deref(), Some("Role for a"));

    let extracted = &run.records[0].classification.as_ref().unwrap().extracted_data;
    assert_eq!(extracted.job_title.as_deref(), Some("Role for a"));
    assert_eq!(extracted.interview_date.as_deref(), Some("2025-09-01"));
    assert_eq!(extracted.action_required.as_deref(), Some("please confirm"));
}

#[tokio::test]
async fn test_missing_company_name_skips_update() {
    let (backend, _) = FakeBackend::new(true, Box::new(|_: &Email| {
        ClassificationOutcome::Parsed(Classification::new(Intent::Offer, "  ", 0.99, ExtractedData::default()))
    }));
    let mut processor = EmailProcessor::new(rules()).with_llm(backend);

    let run = processor.process_emails(&sample_emails()[..1], 0.5).await.unwrap();
    assert!(run.status_updates.is_empty());
    assert!(run.records[0].processed);
}

#[tokio::test]
async fn test_unknown_fallback_never_updates() {
    let (backend, calls) = FakeBackend::new(true, transport_failure());
    let mut processor = EmailProcessor::new(rules()).with_llm(backend);

    let run = processor.process_emails(&sample_emails(), 0.0).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 6);
    assert!(run.status_updates.is_empty());
    for record in &run.records {
        assert_eq!(record.classification.as_ref(), Some(&Classification::unknown()));
    }
}

#[tokio::test]
async fn test_rule_based_fallback_per_email() {
    let (backend, _) = FakeBackend::new(true, Box::new(|email: &Email| {
        if email.id == "3456789012" {
            ClassificationOutcome::ParseFailure {
                raw: "I think this is an offer".to_string(),
                reason: "No JSON object found in response".to_string(),
            }
        } else {
            ClassificationOutcome::Parsed(Classification::unknown())
        }
    }));
    let mut processor = EmailProcessor::new(rules())
        .with_llm(backend)
        .with_fallback(LlmFallback::RuleBased);

    let run = processor.process_emails(&sample_emails(), 0.6).await.unwrap();

    assert_eq!(run.status_updates.len(), 1);
    assert_eq!(run.status_updates[0].company_name, "Databricks");
    assert_eq!(run.status_updates[0].new_status, JobStatus::Offered);
}

#[tokio::test]
async fn test_skip_fallback_marks_email_failed_and_continues() {
    let (backend, calls) = FakeBackend::new(true, Box::new(|email: &Email| {
        if email.id == "1" {
            ClassificationOutcome::TransportFailure(LlmError::Timeout(Duration::from_secs(60)))
        } else {
            ClassificationOutcome::Parsed(Classification::new(Intent::Rejection, "Globex", 0.9, ExtractedData::default()))
        }
    }));
    let mut processor = EmailProcessor::new(rules())
        .with_llm(backend)
        .with_fallback(LlmFallback::Skip);

    let emails = vec![
        email("1", "hr@globex.com", "Update", "..."),
        email("2", "hr@globex.com", "Update", "..."),
    ];
    let run = processor.process_emails(&emails, 0.7).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!run.records[0].processed);
    assert!(run.records[0].classification.is_none());
    assert!(run.records[1].processed);
    assert_eq!(run.status_updates.len(), 1);
    assert_eq!(run.status_updates[0].email_id, "2");

    let summary = run.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.processed, 1);
    assert!((summary.avg_confidence - 0.9).abs() < 1e-9);
}
