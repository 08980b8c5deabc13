use crate::justification::JustificationRecord;
use crate::types::ReviewStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ReviewEntry / ReviewReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub entity_id: String,
    pub reusage_count: u32,
    pub status: ReviewStatus,
    pub review_scheduled: DateTime<Utc>,
}

/// Every justification lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub total_reviewed: usize,
    pub pending_review: Vec<ReviewEntry>,
    pub promotion_candidates: Vec<ReviewEntry>,
    pub deprecation_review: Vec<ReviewEntry>,
    pub monitoring: Vec<ReviewEntry>,
}

impl ReviewReport {
    pub fn bucket(&self, status: ReviewStatus) -> &[ReviewEntry] {
        match status {
            ReviewStatus::PendingReview => &self.pending_review,
            ReviewStatus::PromotionCandidate => &self.promotion_candidates,
            ReviewStatus::DeprecationReview => &self.deprecation_review,
            ReviewStatus::Monitoring => &self.monitoring,
        }
    }

    fn bucket_mut(&mut self, status: ReviewStatus) -> &mut Vec<ReviewEntry> {
        match status {
            ReviewStatus::PendingReview => &mut self.pending_review,
            ReviewStatus::PromotionCandidate => &mut self.promotion_candidates,
            ReviewStatus::DeprecationReview => &mut self.deprecation_review,
            ReviewStatus::Monitoring => &mut self.monitoring,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &ReviewEntry> {
        self.pending_review
            .iter()
            .chain(&self.promotion_candidates)
            .chain(&self.deprecation_review)
            .chain(&self.monitoring)
    }
}

// ---------------------------------------------------------------------------
// CreateReviewClassifier
// ---------------------------------------------------------------------------

pub struct CreateReviewClassifier {
    promotion_threshold: u32,
}

impl CreateReviewClassifier {
    pub fn new(promotion_threshold: u32) -> Self {
        Self {
            promotion_threshold: promotion_threshold.max(1),
        }
    }

    /// Lifecycle status of one CREATE decision at `now`.
    ///
    /// Enough reuse promotes regardless of the review date; otherwise an
    /// unused artifact is pending until its review date and flagged for
    /// deprecation after it. Partial reuse is monitored.
    pub fn classify(&self, record: &JustificationRecord, now: DateTime<Utc>) -> ReviewStatus {
        let due = now >= record.review_scheduled();
        match record.reusage_count {
            n if n >= self.promotion_threshold => ReviewStatus::PromotionCandidate,
            0 if !due => ReviewStatus::PendingReview,
            0 => ReviewStatus::DeprecationReview,
            _ => ReviewStatus::Monitoring,
        }
    }

    pub fn review(&self, records: &[JustificationRecord], now: DateTime<Utc>) -> ReviewReport {
        let mut report = ReviewReport {
            total_reviewed: records.len(),
            ..ReviewReport::default()
        };
        for record in records {
            let status = self.classify(record, now);
            report.bucket_mut(status).push(ReviewEntry {
                entity_id: record.entity_id.clone(),
                reusage_count: record.reusage_count,
                status,
                review_scheduled: record.review_scheduled(),
            });
        }
        for status in [
            ReviewStatus::PendingReview,
            ReviewStatus::PromotionCandidate,
            ReviewStatus::DeprecationReview,
            ReviewStatus::Monitoring,
        ] {
            report.bucket_mut(status).sort_by(|a, b| {
                a.entity_id
                    .cmp(&b.entity_id)
                    .then_with(|| a.review_scheduled.cmp(&b.review_scheduled))
            });
        }
        tracing::debug!(
            total = report.total_reviewed,
            pending = report.pending_review.len(),
            promote = report.promotion_candidates.len(),
            deprecate = report.deprecation_review.len(),
            monitor = report.monitoring.len(),
            "reviewed CREATE decisions"
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
