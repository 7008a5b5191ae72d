use std::collections::BTreeMap;

use serde::Serialize;

use crate::classifier::Intent;

use super::processor::ClassifiedEmail;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingSummary {
    pub total: usize,
    pub processed: usize,
    pub by_intent: BTreeMap<Intent, usize>,
    /// Non-empty company names only
    pub by_company: BTreeMap<String, usize>,
    /// Mean over classified emails, 0 when none
    pub avg_confidence: f64,
}

impl ProcessingSummary {
    pub fn from_records(records: &[ClassifiedEmail]) -> Self {
        let mut summary = ProcessingSummary {
            total: records.len(),
            processed: records.iter().filter(|r| r.processed).count(),
            ..ProcessingSummary::default()
        };

        let mut total_confidence = 0.0;
        let mut classified = 0usize;

        for classification in records.iter().filter_map(|r| r.classification.as_ref()) {
            *summary.by_intent.entry(classification.intent).or_insert(0) += 1;

            if !classification.company_name.is_empty() {
                *summary.by_company.entry(classification.company_name.clone()).or_insert(0) += 1;
            }

            total_confidence += classification.confidence;
            classified += 1;
        }

        if classified > 0 {
            summary.avg_confidence = total_confidence / classified as f64;
        }

        summary
    }

    pub fn avg_confidence_percent(&self) -> u32 {
        (self.avg_confidence * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classification, ExtractedData};

    fn record(id: &str, classification: Option<Classification>) -> ClassifiedEmail {
        ClassifiedEmail {
            email_id: id.to_string(),
            sender: "someone@example.com".to_string(),
            subject: "subject".to_string(),
            processed: classification.is_some(),
            classification,
        }
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            record("1", Some(Classification::new(Intent::Offer, "Databricks", 0.8, ExtractedData::default()))),
            record("2", Some(Classification::new(Intent::Rejection, "Databricks", 0.6, ExtractedData::default()))),
            record("3", Some(Classification::unknown())),
            record("4", None),
        ];

        let summary = ProcessingSummary::from_records(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.by_intent.get(&Intent::Offer), Some(&1));
        assert_eq!(summary.by_intent.get(&Intent::Unknown), Some(&1));
        assert_eq!(summary.by_company.len(), 1);
        assert_eq!(summary.by_company.get("Databricks"), Some(&2));
        assert!((summary.avg_confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_summary_empty() {
        let summary = ProcessingSummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.avg_confidence, 0.0);
    }
}
