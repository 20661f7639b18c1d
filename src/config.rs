//! Tunable thresholds and column conventions for the repair pipeline.
//!
//! Every field carries a default matching the behaviour the question bank
//! was originally cleaned with, so an empty JSON object (or no file at all)
//! yields a working configuration.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Complete configuration consumed by [`crate::repair::process`] and the
/// workbook adapters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    pub columns: ColumnNames,
    pub phrase: PhraseThresholds,
    pub explode: ExplodeSettings,
    pub regroup: RegroupSettings,
    pub reconcile: ReconcileSettings,
    pub output: OutputSettings,
}

impl RepairConfig {
    /// Loads a configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Header names of the question sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub id: String,
    pub question: String,
    pub options: String,
    pub answers: String,
    pub times_attempted: String,
    pub errors: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: "Nº".to_string(),
            question: "Pregunta".to_string(),
            options: "Opciones".to_string(),
            answers: "Respuesta Correcta".to_string(),
            times_attempted: "Veces Realizada".to_string(),
            errors: "Errores".to_string(),
        }
    }
}

/// Limits used to decide whether a line is a complete phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseThresholds {
    /// Minimum trimmed character count for a line to count as a phrase.
    pub min_chars: usize,
    /// Minimum whitespace-delimited word count for a line to count as a phrase.
    pub min_words: usize,
    /// Share of phrase lines required for a list to be "mostly phrases".
    pub majority: f64,
}

impl Default for PhraseThresholds {
    fn default() -> Self {
        Self {
            min_chars: 20,
            min_words: 4,
            majority: 0.6,
        }
    }
}

/// Controls how run-on option cells are split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplodeSettings {
    /// Enables the capital-start fallback for single concatenated lines.
    pub capital_split: bool,
    /// Every capital-start run must contain at least this many words.
    pub capital_split_min_words: usize,
    /// Lines longer than this (in characters) trigger a forced resplit.
    pub long_line_chars: usize,
    /// Rows that are always resplit when a single line remains.
    pub overrides: Vec<ResplitOverride>,
}

impl Default for ExplodeSettings {
    fn default() -> Self {
        Self {
            capital_split: true,
            capital_split_min_words: 2,
            long_line_chars: 160,
            overrides: vec![ResplitOverride {
                label: "solution-vision".to_string(),
                first_id: 316,
                last_id: 335,
            }],
        }
    }
}

impl ExplodeSettings {
    /// Returns the override entry covering the numeric row id, if any.
    pub fn override_for(&self, id: Option<i64>) -> Option<&ResplitOverride> {
        let id = id?;
        self.overrides.iter().find(|entry| entry.ids().contains(&id))
    }
}

/// An inclusive identifier range whose rows are known to hold concatenated
/// options that survive the first splitting pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResplitOverride {
    /// Free-form name recorded in logs when the override fires.
    pub label: String,
    pub first_id: i64,
    pub last_id: i64,
}

impl ResplitOverride {
    pub fn ids(&self) -> RangeInclusive<i64> {
        self.first_id..=self.last_id
    }
}

/// Window sizes tried when stitching fragments back into options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegroupSettings {
    pub min_window: usize,
    pub max_window: usize,
}

impl Default for RegroupSettings {
    fn default() -> Self {
        Self {
            min_window: 2,
            max_window: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    /// Compare containment on a key that ignores punctuation and reads `&`
    /// as `and`. When disabled the plain normalized form is used.
    pub loose_containment: bool,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            loose_containment: true,
        }
    }
}

/// File naming for the derived artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub clean_suffix: String,
    pub backup_suffix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            clean_suffix: "_CLEAN".to_string(),
            backup_suffix: "_backup".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config: RepairConfig = serde_json::from_str("{}").expect("config parsed");
        assert_eq!(config, RepairConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: RepairConfig =
            serde_json::from_str(r#"{"regroup": {"max_window": 4}, "columns": {"id": "Id"}}"#)
                .expect("config parsed");
        assert_eq!(config.regroup.max_window, 4);
        assert_eq!(config.regroup.min_window, 2);
        assert_eq!(config.columns.id, "Id");
        assert_eq!(config.columns.options, "Opciones");
    }

    #[test]
    fn override_lookup_uses_inclusive_ranges() {
        let settings = ExplodeSettings::default();
        assert!(settings.override_for(Some(316)).is_some());
        assert!(settings.override_for(Some(335)).is_some());
        assert!(settings.override_for(Some(336)).is_none());
        assert!(settings.override_for(None).is_none());
    }
}
