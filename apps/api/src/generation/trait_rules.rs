//! Trait rule compiler: turns slider intensities into hard-requirement lines.
//!
//! Thresholds and rule text come from an external JSON file loaded once at
//! startup. A trait scoring at or above `high_threshold` gets `high_rule`, at or
//! below `low_threshold` gets `low_rule`, and anything in between gets
//! `mid_rule` when one is configured. Unconfigured traits are skipped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::campaign::TraitScores;

/// Used by the trait guide when a trait has no configured threshold.
pub const DEFAULT_HIGH_THRESHOLD: f64 = 8.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitConfig {
    pub high_threshold: f64,
    pub low_threshold: f64,
    pub high_rule: String,
    #[serde(default)]
    pub mid_rule: Option<String>,
    pub low_rule: String,
    #[serde(default)]
    pub high_exemplar_allowed: bool,
}

impl TraitConfig {
    /// The rule for `score`'s band, if the band has one.
    pub fn rule_for(&self, score: u8) -> Option<&str> {
        let score = f64::from(score);
        if score >= self.high_threshold {
            Some(&self.high_rule)
        } else if score <= self.low_threshold {
            Some(&self.low_rule)
        } else {
            self.mid_rule.as_deref().filter(|r| !r.trim().is_empty())
        }
    }

    pub fn is_high(&self, score: u8) -> bool {
        f64::from(score) >= self.high_threshold
    }
}

#[derive(Debug, Error)]
pub enum TraitConfigError {
    #[error("could not read trait config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("trait config is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("trait '{name}': low_threshold ({low}) must be below high_threshold ({high})")]
    InvalidThresholds { name: String, low: f64, high: f64 },
}

/// Immutable trait name → config mapping, shared read-only for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitConfigMap(BTreeMap<String, TraitConfig>);

impl TraitConfigMap {
    pub fn load(path: &Path) -> Result<Self, TraitConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TraitConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, TraitConfigError> {
        let entries: BTreeMap<String, TraitConfig> = serde_json::from_str(raw)?;
        for (name, cfg) in &entries {
            if cfg.low_threshold >= cfg.high_threshold {
                return Err(TraitConfigError::InvalidThresholds {
                    name: name.clone(),
                    low: cfg.low_threshold,
                    high: cfg.high_threshold,
                });
            }
        }
        Ok(Self(entries))
    }

    pub fn get(&self, name: &str) -> Option<&TraitConfig> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn high_threshold(&self, name: &str) -> f64 {
        self.get(name)
            .map(|c| c.high_threshold)
            .unwrap_or(DEFAULT_HIGH_THRESHOLD)
    }
}

/// Compiles one instruction line per trait whose band has a configured rule,
/// in trait-name order.
pub fn compile_rules(scores: &TraitScores, config: &TraitConfigMap) -> Vec<String> {
    scores
        .iter()
        .filter_map(|(name, score)| config.get(name)?.rule_for(score))
        .map(str::to_string)
        .collect()
}

/// True when any trait that unlocks the bonus exemplar is scored high.
pub fn allows_exemplar(scores: &TraitScores, config: &TraitConfigMap) -> bool {
    scores.iter().any(|(name, score)| {
        config
            .get(name)
            .is_some_and(|c| c.high_exemplar_allowed && c.is_high(score))
    })
}
