use crate::config::{Config, ReviewConfig};
use crate::justification::{Justification, JustificationRecord};
use crate::matcher::{Match, MatchSet, Matcher, QueryFilters};
use crate::paths::slugify;
use crate::registry::{AdaptationImpact, JustificationStore, Registry};
use crate::review::{CreateReviewClassifier, ReviewReport};
use crate::score::{matched_terms, terms, uncovered_terms, LexicalScorer, Scorer};
use crate::types::{Confidence, Decision, EntityType};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub entity_id: String,
    pub entity_path: String,
    pub entity_type: EntityType,
    pub relevance_score: f64,
    pub decision: Decision,
    pub confidence: Confidence,
    pub rationale: String,
    /// Present exactly when `decision` is ADAPT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptation_impact: Option<AdaptationImpact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_entities: usize,
    pub matches_found: usize,
    pub decision: Decision,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: Summary,
    pub warnings: Vec<String>,
    pub rationale: String,
    pub recommendations: Vec<Recommendation>,
    /// Present exactly when `summary.decision` is CREATE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<Justification>,
}

fn pct(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

// ---------------------------------------------------------------------------
// IncrementalDecisionEngine
// ---------------------------------------------------------------------------

/// REUSE / ADAPT / CREATE policy over one registry snapshot.
pub struct IncrementalDecisionEngine<'a> {
    registry: &'a Registry,
    config: Config,
    scorer: Box<dyn Scorer>,
    store: Option<&'a dyn JustificationStore>,
}

impl<'a> IncrementalDecisionEngine<'a> {
    pub fn new(registry: &'a Registry, config: Config) -> Self {
        Self {
            registry,
            config,
            scorer: Box::new(LexicalScorer::default()),
            store: None,
        }
    }

    pub fn with_scorer(mut self, scorer: impl Scorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    /// Persist CREATE justifications through `store`.
    pub fn with_store(mut self, store: &'a dyn JustificationStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Analyze `intent` against the current time.
    ///
    /// Results are deterministic only for a fixed clock: a CREATE result
    /// carries `now + horizon` as its review date. Use [`Self::analyze_at`]
    /// when the output must be reproducible.
    pub fn analyze(&self, intent: &str, filters: &QueryFilters) -> AnalysisResult {
        self.analyze_at(intent, filters, Utc::now())
    }

    /// Analyze `intent` as of `now`. `intent` must be non-empty.
    pub fn analyze_at(
        &self,
        intent: &str,
        filters: &QueryFilters,
        now: DateTime<Utc>,
    ) -> AnalysisResult {
        let intent = intent.trim();
        let t = &self.config.thresholds;
        let matches =
            Matcher::new(self.scorer.as_ref(), t.min_relevance).find(self.registry, intent, filters);

        let mut warnings = Vec::new();
        if self.registry.is_empty() {
            warnings.push("registry is empty; there is nothing to reuse".to_string());
        } else if matches.candidate_count == 0 {
            warnings.push(format!(
                "filter excluded all entities ({})",
                filters.describe()
            ));
        }
        for id in &matches.skipped {
            warnings.push(format!(
                "entity '{id}' has no description or path and was skipped"
            ));
        }

        let recommendations: Vec<Recommendation> = matches
            .matched()
            .iter()
            .filter(|m| m.score >= t.adapt)
            .take(self.config.limits.max_recommendations)
            .map(|m| self.recommend(m, intent, &mut warnings))
            .collect();

        let summary_for = |decision, confidence| Summary {
            total_entities: self.registry.len(),
            matches_found: matches.matched().len(),
            decision,
            confidence,
        };

        if let Some(top) = recommendations.first() {
            let rationale = match top.decision {
                Decision::Reuse => format!(
                    "'{}' already provides this capability ({} relevance); reuse it instead of creating a new artifact.",
                    top.entity_id,
                    pct(top.relevance_score)
                ),
                _ => format!(
                    "No direct match; '{}' is the closest candidate ({} relevance) and can be adapted.",
                    top.entity_id,
                    pct(top.relevance_score)
                ),
            };
            return AnalysisResult {
                summary: summary_for(top.decision, top.confidence),
                warnings,
                rationale,
                recommendations,
                justification: None,
            };
        }

        // CREATE
        let (confidence, rationale) = if matches.candidate_count == 0 {
            (
                Confidence::Low,
                "No entities were available to evaluate; creating a new artifact is justified."
                    .to_string(),
            )
        } else if matches.matched().is_empty() {
            (
                Confidence::High,
                format!(
                    "None of the {} evaluated entities reaches the minimum relevance ({}); creating a new artifact is justified.",
                    matches.evaluated.len(),
                    pct(t.min_relevance)
                ),
            )
        } else {
            (
                Confidence::Medium,
                format!(
                    "{} related entities found but none reaches the adaptation threshold ({}); creating a new artifact is justified.",
                    matches.matched().len(),
                    pct(t.adapt)
                ),
            )
        };

        let justification = self.justify(intent, &matches, now, &mut warnings);
        self.persist(intent, &justification, now, &mut warnings);

        AnalysisResult {
            summary: summary_for(Decision::Create, confidence),
            warnings,
            rationale,
            recommendations,
            justification: Some(justification),
        }
    }

    /// Classify recorded CREATE decisions as of the current time; see
    /// [`Self::review_create_decisions_at`] for a fixed clock.
    pub fn review_create_decisions(&self) -> ReviewReport {
        self.review_create_decisions_at(Utc::now())
    }

    pub fn review_create_decisions_at(&self, now: DateTime<Utc>) -> ReviewReport {
        CreateReviewClassifier::new(self.config.review.promotion_threshold)
            .review(self.registry.justifications(), now)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn recommend(&self, m: &Match<'_>, intent: &str, warnings: &mut Vec<String>) -> Recommendation {
        let t = &self.config.thresholds;
        let entity = m.entity;
        let description = entity.description.as_deref().unwrap_or_default().trim();
        let matched = matched_terms(intent, &m.text).join(", ");

        let (decision, confidence, rationale, adaptation_impact) = if m.score >= t.reuse {
            let confidence = if m.score >= t.high_confidence {
                Confidence::High
            } else {
                Confidence::Medium
            };
            let rationale = format!(
                "\"{description}\" matches the intent on: {matched}. Relevance {} meets the reuse threshold ({}).",
                pct(m.score),
                pct(t.reuse)
            );
            (Decision::Reuse, confidence, rationale, None)
        } else {
            let midpoint = (t.adapt + t.reuse) / 2.0;
            let confidence = if m.score >= midpoint {
                Confidence::Medium
            } else {
                Confidence::Low
            };
            let impact = self.registry.adaptation_impact(&entity.id);
            let missing = uncovered_terms(intent, &m.text);
            let missing = if missing.is_empty() {
                "phrasing differs".to_string()
            } else {
                format!("missing: {}", missing.join(", "))
            };
            let rationale = format!(
                "\"{description}\" partially matches ({}; shared: {matched}; {missing}). Adapting affects {} direct and {} indirect consumers.",
                pct(m.score),
                impact.direct_count,
                impact.indirect_count
            );
            let total = self.registry.len();
            if total > 0
                && impact.total() > 0
                && impact.total() as f64 / total as f64 >= self.config.adapt_impact_warning_ratio
            {
                warnings.push(format!(
                    "adapting '{}' reaches {} of {} registered entities",
                    entity.id,
                    impact.total(),
                    total
                ));
            }
            (Decision::Adapt, confidence, rationale, Some(impact))
        };

        Recommendation {
            entity_id: entity.id.clone(),
            entity_path: entity.path.clone(),
            entity_type: entity.entity_type,
            relevance_score: m.score,
            decision,
            confidence,
            rationale,
            adaptation_impact,
        }
    }

    fn justify(
        &self,
        intent: &str,
        matches: &MatchSet<'_>,
        now: DateTime<Utc>,
        warnings: &mut Vec<String>,
    ) -> Justification {
        let t = &self.config.thresholds;
        let cap = self
            .config
            .limits
            .max_evaluated_patterns
            .unwrap_or(usize::MAX);
        let evaluated: Vec<&Match<'_>> = matches.evaluated.iter().take(cap).collect();

        let rejection_reasons: BTreeMap<String, String> = evaluated
            .iter()
            .map(|m| {
                let reason = if m.score < t.min_relevance {
                    format!(
                        "relevance {} below minimum relevance floor ({})",
                        pct(m.score),
                        pct(t.min_relevance)
                    )
                } else {
                    format!(
                        "relevance {} below adaptation threshold ({})",
                        pct(m.score),
                        pct(t.adapt)
                    )
                };
                (m.entity.id.clone(), reason)
            })
            .collect();

        let term_count = terms(intent).len();
        let new_capability = match matches.best() {
            Some(best) => {
                let uncovered = uncovered_terms(intent, &best.text);
                if uncovered.is_empty() || uncovered.len() == term_count {
                    intent.to_string()
                } else {
                    format!(
                        "{intent} (not covered by '{}': {})",
                        best.entity.id,
                        uncovered.join(", ")
                    )
                }
            }
            None => intent.to_string(),
        };

        Justification {
            evaluated_patterns: evaluated.iter().map(|m| m.entity.id.clone()).collect(),
            rejection_reasons,
            new_capability,
            review_scheduled: self.review_date(now, warnings),
        }
    }

    fn review_date(&self, now: DateTime<Utc>, warnings: &mut Vec<String>) -> DateTime<Utc> {
        let days = self.config.review.horizon_days;
        if let Some(at) = Duration::try_days(days).and_then(|d| now.checked_add_signed(d)) {
            return at;
        }
        let fallback = ReviewConfig::default().horizon_days;
        warnings.push(format!(
            "review.horizon_days={days} is out of range; scheduling the review in {fallback} days"
        ));
        now + Duration::days(fallback)
    }

    fn persist(
        &self,
        intent: &str,
        justification: &Justification,
        now: DateTime<Utc>,
        warnings: &mut Vec<String>,
    ) {
        let Some(store) = self.store else {
            return;
        };
        let mut entity_id = slugify(intent);
        if entity_id.is_empty() {
            entity_id = "unnamed-capability".to_string();
        }
        if self.registry.has_justification_for(&entity_id) {
            tracing::debug!(entity = %entity_id, "CREATE justification already recorded");
            return;
        }
        let record = JustificationRecord {
            entity_id,
            intent: intent.to_string(),
            decided_at: now,
            justification: justification.clone(),
            reusage_count: 0,
        };
        if let Err(e) = store.append(&record) {
            tracing::warn!(entity = %record.entity_id, error = %e, "failed to record CREATE justification");
            warnings.push(format!("failed to record CREATE justification: {e}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
