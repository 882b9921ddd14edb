//! Immutable key → locator registry

use crate::{errors::LocatorError, source::*, types::*};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Origin label for registries built from in-memory data
pub const INLINE_ORIGIN: &str = "<inline>";

/// Registry of locator definitions.
///
/// Built once and never mutated afterwards; share it with `Arc` between the
/// interaction driver and anything else that needs to resolve keys.
#[derive(Debug, Clone)]
pub struct LocatorRegistry {
    entries: HashMap<String, LocatorDefinition>,
    origin: String,
}

impl LocatorRegistry {
    /// Build a registry from definitions.
    ///
    /// When a key repeats, the last definition wins and the overwrite is
    /// logged. An empty key fails the whole load.
    pub fn from_definitions<I>(definitions: I, origin: impl Into<String>) -> Result<Self, LocatorError>
    where
        I: IntoIterator<Item = LocatorDefinition>,
    {
        let origin = origin.into();
        let mut entries = HashMap::new();

        for (index, def) in definitions.into_iter().enumerate() {
            if def.key.is_empty() {
                return Err(LocatorError::ConfigLoad {
                    origin,
                    reason: format!("record #{} has an empty key", index),
                });
            }
            if let Some(previous) = entries.insert(def.key.clone(), def) {
                warn!(
                    key = %previous.key,
                    origin = %origin,
                    "duplicate locator key; last definition wins"
                );
            }
        }

        debug!(origin = %origin, count = entries.len(), "locator registry built");
        Ok(Self { entries, origin })
    }

    /// Decode a stream of records in the given format
    pub fn from_reader<R: Read>(
        reader: R,
        format: SourceFormat,
        origin: impl Into<String>,
    ) -> Result<Self, LocatorError> {
        let origin = origin.into();
        let decoded: Result<Vec<LocatorDefinition>, String> = match format {
            SourceFormat::Json => serde_json::from_reader(reader).map_err(|err| err.to_string()),
            SourceFormat::Yaml => serde_yaml::from_reader(reader).map_err(|err| err.to_string()),
        };
        let definitions = decoded.map_err(|reason| LocatorError::ConfigLoad {
            origin: origin.clone(),
            reason,
        })?;
        Self::from_definitions(definitions, origin)
    }

    /// Decode an in-memory JSON document
    pub fn from_json_str(json: &str) -> Result<Self, LocatorError> {
        Self::from_reader(json.as_bytes(), SourceFormat::Json, INLINE_ORIGIN)
    }

    /// Load a single file; format follows the extension
    pub fn load_path(path: &Path) -> Result<Self, LocatorError> {
        let file = File::open(path).map_err(|_| LocatorError::SourceNotFound {
            tried: vec![path.to_path_buf()],
        })?;
        Self::from_reader(
            BufReader::new(file),
            SourceFormat::from_path(path),
            path.display().to_string(),
        )
    }

    /// Load from the first readable candidate.
    ///
    /// A candidate that opens but does not decode fails the load; it is not
    /// skipped in favour of later candidates.
    pub fn load(candidates: &SourceCandidates) -> Result<Self, LocatorError> {
        let (path, reader) = candidates
            .open_first()
            .map_err(|tried| LocatorError::SourceNotFound { tried })?;

        let registry = Self::from_reader(
            reader,
            SourceFormat::from_path(&path),
            path.display().to_string(),
        )?;
        info!(
            path = %path.display(),
            count = registry.len(),
            "Loaded locator definitions"
        );
        Ok(registry)
    }

    /// Resolve a key into a selector descriptor.
    ///
    /// Exact lookup; no normalization of the key or the stored type.
    pub fn resolve(&self, key: &str) -> Result<ResolvedSelector, LocatorError> {
        let def = self
            .entries
            .get(key)
            .ok_or_else(|| LocatorError::UnknownKey {
                key: key.to_string(),
            })?;

        let strategy = def
            .strategy()
            .ok_or_else(|| LocatorError::UnsupportedStrategy {
                key: def.key.clone(),
                strategy_type: def.strategy_type.clone(),
            })?;

        Ok(ResolvedSelector::new(strategy, def.value.clone()))
    }

    /// Every definition whose type would fail resolution, sorted by key
    pub fn validate(&self) -> Vec<LocatorError> {
        self.definitions()
            .into_iter()
            .filter(|def| def.strategy().is_none())
            .map(|def| LocatorError::UnsupportedStrategy {
                key: def.key.clone(),
                strategy_type: def.strategy_type.clone(),
            })
            .collect()
    }

    /// Raw definition for a key
    pub fn get(&self, key: &str) -> Option<&LocatorDefinition> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Definitions in key order
    pub fn definitions(&self) -> Vec<&LocatorDefinition> {
        let mut defs: Vec<&LocatorDefinition> = self.entries.values().collect();
        defs.sort_by(|a, b| a.key.cmp(&b.key));
        defs
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path (or `<inline>`) the registry was loaded from
    pub fn origin(&self) -> &str {
        &self.origin
    }
}
