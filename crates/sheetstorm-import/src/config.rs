//! Pipeline configuration

use crate::entity::EntityType;
use serde::{Deserialize, Serialize};

/// Import pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Target entity assigned to every sheet on first load
    pub default_entity: EntityType,
    /// What counts as a missing required value
    pub missing_values: MissingValuePolicy,
}

impl ImportConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default target entity
    #[inline]
    #[must_use]
    pub fn with_default_entity(mut self, entity: EntityType) -> Self {
        self.default_entity = entity;
        self
    }

    /// With missing-value policy
    #[inline]
    #[must_use]
    pub fn with_missing_values(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_values = policy;
        self
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_entity: EntityType::TimelineEvents,
            missing_values: MissingValuePolicy::Falsy,
        }
    }
}

/// Rule deciding whether a required cell holds a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Null, `false`, `0`, and `""` are all missing
    #[default]
    Falsy,
    /// Only null and blank strings are missing; `0` and `false` are values
    Blank,
}
