use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use log::{error, info, warn};

use jobmail::config::Config;
use jobmail::date_utils;
use jobmail::email::{sample_emails, Email};
use jobmail::gmail_client::GmailClient;
use jobmail::pipeline::{EmailProcessor, ProcessingRun};
use jobmail::status_update::{self, StatusUpdater};

#[derive(Parser)]
#[command(name = "jobmail")]
#[command(about = "Classify job-application emails and preview job tracker status updates")]
#[command(version = "0.1.0")]
struct Args {
    /// Minimum confidence for a status update (overrides CONFIDENCE_THRESHOLD)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// How many days back to search Gmail (overrides EMAIL_DAYS_BACK)
    #[arg(short, long)]
    days_back: Option<u32>,

    /// Classify with the local Ollama model (overrides USE_OLLAMA)
    #[arg(long)]
    use_ollama: bool,

    /// Use the built-in sample emails instead of Gmail
    #[arg(long)]
    sample: bool,

    /// Maximum number of emails to process
    #[arg(short = 'l', long)]
    limit: Option<usize>,

    /// Export status updates to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Check the configuration without connecting
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();

    env_logger::init();

    info!("🚀 Starting job email triage");

    let mut config = Config::new()?;
    if let Some(threshold) = args.threshold {
        config.pipeline.confidence_threshold = threshold;
    }
    if let Some(days_back) = args.days_back {
        config.pipeline.email_days_back = days_back;
    }
    if args.use_ollama {
        config.ollama.enabled = true;
    }

    let issues = config.validate();
    if !issues.is_empty() {
        warn!("Configuration issues found:");
        for issue in &issues {
            warn!("  - {}", issue);
        }
    }

    if args.check_config {
        print_config(&config, &issues);
        return Ok(());
    }

    info!("Running in {} mode", if config.dry_run { "DRY-RUN" } else { "LIVE" });
    info!(
        "Email processing: {} days back, {} confidence threshold",
        config.pipeline.email_days_back, config.pipeline.confidence_threshold
    );

    let mut processor = EmailProcessor::from_config(&config)?;

    let mut emails = load_emails(&config, args.sample).await;
    if let Some(limit) = args.limit {
        emails.truncate(limit);
    }

    if emails.is_empty() {
        info!("No emails found to process");
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("📬 JOB EMAIL TRIAGE - {} EMAIL(S), {} CLASSIFIER", emails.len(), processor.active_strategy_name().to_uppercase());
    println!("{}", "=".repeat(80));

    let run = match processor.process_emails(&emails, config.pipeline.confidence_threshold).await {
        Ok(run) => run,
        Err(e) => {
            error!("❌ Error while processing emails: {}", e);
            return Err(e.into());
        }
    };

    print_run(&run);

    if run.status_updates.is_empty() {
        println!("ℹ️  No status updates generated (confidence threshold not met or no actionable emails)");
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("📋 STATUS UPDATE PREVIEW ({} MODE)", if config.dry_run { "DRY-RUN" } else { "LIVE" });
    println!("{}", "=".repeat(80));

    let updater = StatusUpdater::new(config.dry_run);
    updater.apply_all(&run.status_updates);
    println!("\n{}", StatusUpdater::summary(&run.status_updates));

    match &args.csv {
        Some(path) => status_update::export_csv(&run.status_updates, path)?,
        None => info!(
            "💾 Use --csv {} to export these updates",
            status_update::default_export_filename(Utc::now().date_naive())
        ),
    }

    println!("{}", "=".repeat(80));
    info!("✅ Pipeline completed successfully");

    if config.dry_run {
        info!("🔧 Dry-run mode: no tracker was modified");
    }

    Ok(())
}

/// Gmail when configured, the sample set otherwise or on failure
async fn load_emails(config: &Config, force_sample: bool) -> Vec<Email> {
    let gmail = match (&config.gmail, force_sample) {
        (Some(gmail), false) => gmail,
        _ => {
            info!("📧 Using sample emails for demonstration");
            let samples = sample_emails();
            let now = Utc::now();
            let stale = samples.iter()
                .filter(|email| !date_utils::is_recent(&email.date, config.pipeline.email_days_back, &now))
                .count();
            if stale > 0 {
                info!("ℹ️  {} sample email(s) are older than the {}-day window and are processed anyway", stale, config.pipeline.email_days_back);
            }
            return samples;
        }
    };

    info!("📧 Fetching emails from Gmail API...");
    let result = match GmailClient::new(gmail).await {
        Ok(client) => client.fetch_job_emails(config.pipeline.email_days_back).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(emails) => emails,
        Err(e) => {
            error!("❌ Failed to fetch emails from Gmail, falling back to sample data: {:#}", e);
            sample_emails()
        }
    }
}

fn print_config(config: &Config, issues: &[String]) {
    if issues.is_empty() {
        println!("✅ Configuration valid!");
    } else {
        println!("⚠️  Configuration has {} issue(s):", issues.len());
        for issue in issues {
            println!("   - {}", issue);
        }
    }

    match &config.gmail {
        Some(gmail) => {
            println!("📧 Gmail API OAuth2");
            println!("🔑 Credentials: {}", gmail.credentials_path);
            println!("💾 Token cache: {}", gmail.token_cache_path);
        }
        None => println!("📧 Gmail not configured (sample emails)"),
    }
    println!("🎯 Confidence threshold: {}", config.pipeline.confidence_threshold);
    println!("📅 Days back: {}", config.pipeline.email_days_back);
    if config.ollama.enabled {
        println!("🤖 Ollama: {} at {} (fallback: {:?})", config.ollama.model, config.ollama.url, config.ollama.fallback);
    } else {
        println!("🤖 Ollama: disabled (rule-based classifier)");
    }
    println!("🧪 Dry-run: {}", config.dry_run);
}

fn print_run(run: &ProcessingRun) {
    for (index, record) in run.records.iter().enumerate() {
        println!("📧 Email {}/{} (ID: {})", index + 1, run.records.len(), record.email_id);
        println!("   From: {}", record.sender);
        println!("   Subject: {}", record.subject);
        match &record.classification {
            Some(classification) => {
                println!("   🏷️  Intent: {} ({}%)", classification.intent, classification.confidence_percent());
                if !classification.company_name.is_empty() {
                    println!("   🏢 Company: {}", classification.company_name);
                }
                if let Some(title) = &classification.extracted_data.job_title {
                    println!("   💼 Job title: {}", title);
                }
                if let Some(date) = &classification.extracted_data.interview_date {
                    println!("   📅 Date mentioned: {}", date);
                }
            }
            None => println!("   ❌ Not classified"),
        }
        println!("{}", "-".repeat(60));
    }

    let summary = run.summary();
    println!("📊 Email Processing Summary:");
    println!("   - Total emails: {}", summary.total);
    println!("   - Processed: {}", summary.processed);
    println!("   - Average confidence: {}%", summary.avg_confidence_percent());
    for (intent, count) in &summary.by_intent {
        println!("   - {}: {}", intent, count);
    }
    println!("   - Companies: {}", summary.by_company.len());
}
