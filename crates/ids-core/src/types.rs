use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Task,
    Script,
    Agent,
    Template,
    Workflow,
    Checklist,
    Data,
    Tool,
    Util,
    Module,
}

impl EntityType {
    pub fn all() -> &'static [EntityType] {
        &[
            EntityType::Task,
            EntityType::Script,
            EntityType::Agent,
            EntityType::Template,
            EntityType::Workflow,
            EntityType::Checklist,
            EntityType::Data,
            EntityType::Tool,
            EntityType::Util,
            EntityType::Module,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Task => "task",
            EntityType::Script => "script",
            EntityType::Agent => "agent",
            EntityType::Template => "template",
            EntityType::Workflow => "workflow",
            EntityType::Checklist => "checklist",
            EntityType::Data => "data",
            EntityType::Tool => "tool",
            EntityType::Util => "util",
            EntityType::Module => "module",
        }
    }

    /// Group key under `entities:` in the registry file.
    pub fn group(self) -> &'static str {
        match self {
            EntityType::Task => "tasks",
            EntityType::Script => "scripts",
            EntityType::Agent => "agents",
            EntityType::Template => "templates",
            EntityType::Workflow => "workflows",
            EntityType::Checklist => "checklists",
            EntityType::Data => "data",
            EntityType::Tool => "tools",
            EntityType::Util => "utils",
            EntityType::Module => "modules",
        }
    }

    pub fn from_group(group: &str) -> Option<EntityType> {
        Self::all().iter().copied().find(|t| t.group() == group)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = crate::error::IdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| crate::error::IdsError::InvalidEntityType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Reuse,
    Adapt,
    Create,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Reuse => "REUSE",
            Decision::Adapt => "ADAPT",
            Decision::Create => "CREATE",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReviewStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewStatus {
    PendingReview,
    PromotionCandidate,
    DeprecationReview,
    Monitoring,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::PendingReview => "pending-review",
            ReviewStatus::PromotionCandidate => "promotion-candidate",
            ReviewStatus::DeprecationReview => "deprecation-review",
            ReviewStatus::Monitoring => "monitoring",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
