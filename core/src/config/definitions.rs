//! Definition record loading.
//!
//! Records are JSON, keyed by `id`, with optional fields falling back to
//! documented defaults (cooldown 0, tolerance 20, threshold 0.7,
//! combo_type AND). A bad file is logged and skipped; only directory
//! level IO failures abort a load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::conditions::ConditionDefinition;
use crate::monitor::TeammateDefinition;
use crate::skills::SkillDefinition;

/// One definition file: any mix of the three record kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionConfig {
    #[serde(default)]
    pub conditions: Vec<ConditionDefinition>,

    #[serde(default)]
    pub skills: Vec<SkillDefinition>,

    #[serde(default)]
    pub teammates: Vec<TeammateDefinition>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Merged definitions from all loaded files.
///
/// Skills and teammates keep their load order: pool order is the
/// documented tie-break for equal priorities/scores, so it must be
/// stable across loads.
#[derive(Debug, Clone, Default)]
pub struct DefinitionSet {
    conditions: HashMap<String, ConditionDefinition>,
    skills: Vec<SkillDefinition>,
    teammates: Vec<TeammateDefinition>,
}

impl DefinitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a config in. A record whose id already exists replaces the
    /// earlier one **in place** (custom overriding builtin keeps the
    /// builtin's pool position); replaced ids are returned so callers
    /// can report them.
    pub fn add_config(&mut self, config: DefinitionConfig) -> Vec<String> {
        let mut replaced = Vec::new();

        for condition in config.conditions {
            if self.conditions.insert(condition.id.clone(), condition.clone()).is_some() {
                replaced.push(condition.id);
            }
        }

        for skill in config.skills {
            match self.skills.iter_mut().find(|s| s.id == skill.id) {
                Some(slot) => {
                    replaced.push(skill.id.clone());
                    *slot = skill;
                }
                None => self.skills.push(skill),
            }
        }

        for teammate in config.teammates {
            match self.teammates.iter_mut().find(|t| t.id == teammate.id) {
                Some(slot) => {
                    replaced.push(teammate.id.clone());
                    *slot = teammate;
                }
                None => self.teammates.push(teammate),
            }
        }

        replaced
    }

    pub fn get_condition(&self, id: &str) -> Option<&ConditionDefinition> {
        self.conditions.get(id)
    }

    pub fn get_skill(&self, id: &str) -> Option<&SkillDefinition> {
        self.skills.iter().find(|s| s.id == id)
    }

    pub fn skills(&self) -> &[SkillDefinition] {
        &self.skills
    }

    pub fn teammates(&self) -> &[TeammateDefinition] {
        &self.teammates
    }

    pub fn conditions(&self) -> impl Iterator<Item = &ConditionDefinition> {
        self.conditions.values()
    }

    pub fn enabled_skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.iter().filter(|s| s.enabled)
    }

    pub fn enabled_teammates(&self) -> impl Iterator<Item = &TeammateDefinition> {
        self.teammates.iter().filter(|t| t.enabled)
    }

    /// Break the set apart for handing to the scheduler and monitor.
    pub fn into_parts(
        self,
    ) -> (Vec<ConditionDefinition>, Vec<SkillDefinition>, Vec<TeammateDefinition>) {
        (self.conditions.into_values().collect(), self.skills, self.teammates)
    }
}

/// Load definitions from the builtin and custom config directories.
///
/// Builtin definitions load first; custom definitions with the same id
/// override them. Either directory may be absent.
pub fn load_definitions(
    builtin_dir: Option<&Path>,
    custom_dir: Option<&Path>,
) -> Result<DefinitionSet, ConfigError> {
    let mut set = DefinitionSet::new();

    if let Some(dir) = builtin_dir {
        if dir.exists() {
            load_directory(&mut set, dir, "builtin")?;
        }
    }
    if let Some(dir) = custom_dir {
        if dir.exists() {
            load_directory(&mut set, dir, "custom")?;
        }
    }

    Ok(set)
}

/// Load all JSON files from a directory, sorted by file name so pool
/// order is deterministic across platforms.
fn load_directory(set: &mut DefinitionSet, dir: &Path, source: &str) -> Result<(), ConfigError> {
    let entries = fs::read_dir(dir).map_err(|e| ConfigError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        match load_file(&path) {
            Ok(config) => {
                let replaced = set.add_config(config);
                if !replaced.is_empty() {
                    warn!(%source, ?path, ?replaced, "definition ids replaced earlier records");
                }
            }
            Err(err) => {
                // One broken file must not take down the rest of the load.
                warn!(%source, ?path, %err, "skipping unreadable definition file");
            }
        }
    }

    Ok(())
}

/// Load a single JSON definition file.
pub fn load_file(path: &Path) -> Result<DefinitionConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}
