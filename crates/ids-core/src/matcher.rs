use crate::registry::{Entity, Registry};
use crate::score::Scorer;
use crate::types::EntityType;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// QueryFilters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    /// Exact match against the entity's category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl QueryFilters {
    pub fn new(entity_type: Option<EntityType>, category: Option<String>) -> Self {
        Self {
            entity_type,
            category,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entity_type.is_none() && self.category.is_none()
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(t) = self.entity_type {
            parts.push(format!("type={t}"));
        }
        if let Some(c) = &self.category {
            parts.push(format!("category={c}"));
        }
        if parts.is_empty() {
            "no filters".to_string()
        } else {
            parts.join(", ")
        }
    }
}

// ---------------------------------------------------------------------------
// Match / MatchSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Match<'r> {
    pub entity: &'r Entity,
    pub score: f64,
    /// The text the score was computed against.
    pub text: String,
}

/// Outcome of matching one intent against a registry snapshot.
#[derive(Debug, Clone)]
pub struct MatchSet<'r> {
    /// Entities left after filtering, scored or not.
    pub candidate_count: usize,
    /// Every scored candidate, best first, ties by id.
    pub evaluated: Vec<Match<'r>>,
    /// Ids of candidates that could not be scored.
    pub skipped: Vec<String>,
    matched: usize,
}

impl<'r> MatchSet<'r> {
    /// Candidates at or above the relevance floor, best first.
    pub fn matched(&self) -> &[Match<'r>] {
        &self.evaluated[..self.matched]
    }

    pub fn best(&self) -> Option<&Match<'r>> {
        self.evaluated.first()
    }
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

pub struct Matcher<'a> {
    scorer: &'a dyn Scorer,
    min_relevance: f64,
}

impl<'a> Matcher<'a> {
    pub fn new(scorer: &'a dyn Scorer, min_relevance: f64) -> Self {
        Self {
            scorer,
            min_relevance,
        }
    }

    /// Filter, score and rank. Never fails; an empty registry or a filter
    /// that excludes everything simply yields no matches.
    pub fn find<'r>(
        &self,
        registry: &'r Registry,
        intent: &str,
        filters: &QueryFilters,
    ) -> MatchSet<'r> {
        let candidates = registry.candidates(filters.entity_type, filters.category.as_deref());
        let candidate_count = candidates.len();

        let mut evaluated = Vec::with_capacity(candidate_count);
        let mut skipped = Vec::new();
        for entity in candidates {
            let Some(text) = entity.searchable_text() else {
                tracing::warn!(entity = %entity.id, "entity has no searchable text, skipping");
                skipped.push(entity.id.clone());
                continue;
            };
            let score = self.scorer.score(intent, &text).clamp(0.0, 1.0);
            evaluated.push(Match {
                entity,
                score,
                text,
            });
        }

        evaluated.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.entity.id.cmp(&b.entity.id))
        });
        let matched = evaluated
            .iter()
            .take_while(|m| m.score >= self.min_relevance)
            .count();

        tracing::debug!(
            intent,
            candidates = candidate_count,
            matched,
            skipped = skipped.len(),
            "matched intent"
        );

        MatchSet {
            candidate_count,
            evaluated,
            skipped,
            matched,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
