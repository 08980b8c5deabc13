use crate::error::{IdsError, RegistryLoadError, Result};
use crate::justification::JustificationRecord;
use crate::paths;
use crate::types::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Direct consumers: ids of entities that use this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub used_by: Vec<String>,
    /// Ids this entity depends on; each dependency gains this entity as a
    /// direct consumer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl Entity {
    pub fn new(id: impl Into<String>, entity_type: EntityType, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            entity_type,
            category: None,
            description: None,
            keywords: Vec::new(),
            used_by: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_used_by<I, S>(mut self, consumers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.used_by = consumers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Text the matcher scores against: description, keywords, id words and
    /// the path's file stem.
    ///
    /// `None` when the entity cannot be scored (blank description or path).
    pub fn searchable_text(&self) -> Option<String> {
        let description = self.description.as_deref().map(str::trim).unwrap_or("");
        if description.is_empty() || self.path.trim().is_empty() {
            return None;
        }
        let stem = Path::new(&self.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let parts: Vec<&str> = std::iter::once(description)
            .chain(self.keywords.iter().map(String::as_str))
            .chain([self.id.as_str(), stem])
            .filter(|s| !s.is_empty())
            .collect();
        Some(parts.join(" "))
    }
}

// ---------------------------------------------------------------------------
// AdaptationImpact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationImpact {
    pub direct_count: usize,
    pub indirect_count: usize,
}

impl AdaptationImpact {
    pub fn total(&self) -> usize {
        self.direct_count + self.indirect_count
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable, fully indexed snapshot of the catalog plus the CREATE
/// justification log.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: Vec<Entity>,
    by_id: HashMap<String, usize>,
    by_type: BTreeMap<EntityType, Vec<usize>>,
    by_category: BTreeMap<String, Vec<usize>>,
    consumers: HashMap<String, BTreeSet<String>>,
    justifications: Vec<JustificationRecord>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index `entities`, rejecting blank or duplicate ids.
    pub fn from_parts(
        mut entities: Vec<Entity>,
        justifications: Vec<JustificationRecord>,
    ) -> std::result::Result<Self, RegistryLoadError> {
        entities.sort_by(|a, b| a.id.cmp(&b.id));

        let mut by_id = HashMap::with_capacity(entities.len());
        let mut by_type: BTreeMap<EntityType, Vec<usize>> = BTreeMap::new();
        let mut by_category: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut consumers: HashMap<String, BTreeSet<String>> = HashMap::new();

        for (idx, e) in entities.iter().enumerate() {
            if e.id.trim().is_empty() {
                return Err(RegistryLoadError::InvalidEntity {
                    id: e.id.clone(),
                    reason: "id must not be blank".to_string(),
                });
            }
            if by_id.insert(e.id.clone(), idx).is_some() {
                return Err(RegistryLoadError::DuplicateId(e.id.clone()));
            }
            by_type.entry(e.entity_type).or_default().push(idx);
            if let Some(cat) = &e.category {
                by_category.entry(cat.clone()).or_default().push(idx);
            }
            for consumer in e.used_by.iter().filter(|c| **c != e.id) {
                consumers
                    .entry(e.id.clone())
                    .or_default()
                    .insert(consumer.clone());
            }
            for dep in e.dependencies.iter().filter(|d| **d != e.id) {
                consumers.entry(dep.clone()).or_default().insert(e.id.clone());
            }
        }

        Ok(Self {
            entities,
            by_id,
            by_type,
            by_category,
            consumers,
            justifications,
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities, ordered by id.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.by_id.get(id).map(|&i| &self.entities[i])
    }

    pub fn justifications(&self) -> &[JustificationRecord] {
        &self.justifications
    }

    pub fn has_justification_for(&self, entity_id: &str) -> bool {
        self.justifications.iter().any(|j| j.entity_id == entity_id)
    }

    /// Entities matching both filters, ordered by id. `None` means no filter.
    pub fn candidates(
        &self,
        entity_type: Option<EntityType>,
        category: Option<&str>,
    ) -> Vec<&Entity> {
        let indices: Vec<usize> = match (entity_type, category) {
            (None, None) => (0..self.entities.len()).collect(),
            (Some(t), None) => self.by_type.get(&t).cloned().unwrap_or_default(),
            (None, Some(c)) => self.by_category.get(c).cloned().unwrap_or_default(),
            (Some(t), Some(c)) => self
                .by_type
                .get(&t)
                .map(|ids| {
                    ids.iter()
                        .copied()
                        .filter(|&i| self.entities[i].category.as_deref() == Some(c))
                        .collect()
                })
                .unwrap_or_default(),
        };
        indices.into_iter().map(|i| &self.entities[i]).collect()
    }

    /// Direct consumers of `id`, in id order.
    pub fn direct_consumers(&self, id: &str) -> Vec<&str> {
        self.consumers
            .get(id)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Count direct consumers and every consumer reachable from them.
    ///
    /// Breadth-first with a visited set, so cycles in the consumer graph
    /// terminate; `id` itself is never counted.
    pub fn adaptation_impact(&self, id: &str) -> AdaptationImpact {
        let direct = self.direct_consumers(id);
        let mut seen: HashSet<&str> = HashSet::with_capacity(direct.len() + 1);
        seen.insert(id);
        seen.extend(direct.iter().copied());

        let mut queue: VecDeque<&str> = direct.iter().copied().collect();
        let mut indirect_count = 0;
        while let Some(current) = queue.pop_front() {
            for next in self.direct_consumers(current) {
                if seen.insert(next) {
                    indirect_count += 1;
                    queue.push_back(next);
                }
            }
        }

        AdaptationImpact {
            direct_count: direct.len(),
            indirect_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Loader / store traits
// ---------------------------------------------------------------------------

/// Read side of the registry store.
pub trait RegistryLoader {
    /// Materialize a complete snapshot or fail; never a partial one.
    fn load(&self) -> std::result::Result<Registry, RegistryLoadError>;
}

/// Append-only write side used by CREATE decisions.
pub trait JustificationStore {
    fn append(&self, record: &JustificationRecord) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<u32>,
    #[serde(default)]
    entities: BTreeMap<String, BTreeMap<String, EntityEntry>>,
}

#[derive(Debug, Deserialize)]
struct EntityEntry {
    path: String,
    #[serde(default, rename = "type")]
    entity_type: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "purpose")]
    description: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default, alias = "usedBy")]
    used_by: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

/// YAML-backed registry: `.ids/registry.yaml` plus the justification log.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    registry_path: PathBuf,
    justifications_path: PathBuf,
}

impl FileRegistry {
    pub fn new(root: &Path) -> Self {
        Self::with_paths(paths::registry_path(root), paths::justifications_path(root))
    }

    pub fn with_paths(registry_path: PathBuf, justifications_path: PathBuf) -> Self {
        Self {
            registry_path,
            justifications_path,
        }
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn justifications_path(&self) -> &Path {
        &self.justifications_path
    }

    fn read_yaml(path: &Path) -> std::result::Result<String, RegistryLoadError> {
        std::fs::read_to_string(path).map_err(|source| RegistryLoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_entities(&self) -> std::result::Result<Vec<Entity>, RegistryLoadError> {
        if !self.registry_path.exists() {
            return Err(RegistryLoadError::NotFound(self.registry_path.clone()));
        }
        let data = Self::read_yaml(&self.registry_path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        let file: RegistryFile =
            serde_yaml::from_str(&data).map_err(|source| RegistryLoadError::Malformed {
                path: self.registry_path.clone(),
                source,
            })?;

        let mut entities = Vec::new();
        for (group, entries) in file.entities {
            let entity_type = EntityType::from_group(&group)
                .ok_or_else(|| RegistryLoadError::UnknownType(group.clone()))?;
            for (id, entry) in entries {
                if let Some(declared) = entry.entity_type.as_deref() {
                    if declared != entity_type.as_str() {
                        return Err(RegistryLoadError::InvalidEntity {
                            id,
                            reason: format!(
                                "declared type '{declared}' does not match group '{group}'"
                            ),
                        });
                    }
                }
                entities.push(Entity {
                    id,
                    path: entry.path,
                    entity_type,
                    category: entry.category,
                    description: entry.description,
                    keywords: entry.keywords,
                    used_by: entry.used_by,
                    dependencies: entry.dependencies,
                });
            }
        }
        Ok(entities)
    }

    fn read_justifications(
        &self,
    ) -> std::result::Result<Vec<JustificationRecord>, RegistryLoadError> {
        if !self.justifications_path.exists() {
            return Ok(Vec::new());
        }
        let data = Self::read_yaml(&self.justifications_path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yaml::from_str(&data).map_err(|source| RegistryLoadError::Malformed {
            path: self.justifications_path.clone(),
            source,
        })
    }
}

impl RegistryLoader for FileRegistry {
    fn load(&self) -> std::result::Result<Registry, RegistryLoadError> {
        let entities = self.read_entities()?;
        let justifications = self.read_justifications()?;
        let registry = Registry::from_parts(entities, justifications)?;
        tracing::debug!(
            path = %self.registry_path.display(),
            entities = registry.len(),
            justifications = registry.justifications().len(),
            "registry loaded"
        );
        Ok(registry)
    }
}

impl JustificationStore for FileRegistry {
    /// Re-read the log, append, and replace the file atomically.
    fn append(&self, record: &JustificationRecord) -> Result<()> {
        let mut records = self.read_justifications()?;
        records.push(record.clone());
        let data = serde_yaml::to_string(&records)?;
        crate::io::atomic_write(&self.justifications_path, data.as_bytes())?;
        tracing::info!(
            entity = %record.entity_id,
            path = %self.justifications_path.display(),
            "recorded CREATE justification"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryRegistry
// ---------------------------------------------------------------------------

/// In-memory store for fixtures and embedding callers.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entities: Vec<Entity>,
    records: Mutex<Vec<JustificationRecord>>,
}

impl MemoryRegistry {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn with_records(entities: Vec<Entity>, records: Vec<JustificationRecord>) -> Self {
        Self {
            entities,
            records: Mutex::new(records),
        }
    }

    pub fn records(&self) -> Vec<JustificationRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl RegistryLoader for MemoryRegistry {
    fn load(&self) -> std::result::Result<Registry, RegistryLoadError> {
        Registry::from_parts(self.entities.clone(), self.records())
    }
}

impl JustificationStore for MemoryRegistry {
    fn append(&self, record: &JustificationRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| IdsError::Store("justification log lock poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
