use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// One step of the temporal-proximity decay function: a context updated
/// less than `max_age_hours` ago scores `confidence`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalBand {
    pub max_age_hours: i64,
    pub confidence: f32,
}

impl TemporalBand {
    pub const fn new(max_age_hours: i64, confidence: f32) -> Self {
        Self {
            max_age_hours,
            confidence,
        }
    }
}

/// Tuning knobs for the recovery engine.
///
/// Defaults reproduce the production values; every threshold that drives an
/// accept/reject decision lives here rather than inline at a call site.
/// Overridable from a TOML file for tuning without code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// A resolver result must exceed this to be accepted by the arbiter
    /// (strict inequality).
    pub acceptance_threshold: f32,

    /// Confidence assigned to an exact reference-code match.
    pub reference_confidence: f32,

    /// Minimum vision confidence for a circled mark to count as a
    /// selection.
    pub annotation_confidence: f32,

    /// A template score must exceed this for a waiting context to win.
    pub template_match_threshold: f32,

    /// Soft signal emitted when several waiting contexts compete and none
    /// wins outright. Kept below `acceptance_threshold` so the arbiter
    /// falls through to later strategies.
    pub template_ambiguous_confidence: f32,

    /// Sentinel for the "found several live contexts, pick one" outcome.
    /// Distinct from zero so callers can tell it apart from a clean miss.
    pub ambiguous_confidence: f32,

    /// Extracted text shorter than this carries too little signal for
    /// similarity scoring.
    pub min_similarity_text_len: usize,

    /// Keyword extraction keeps the first N surviving tokens.
    pub max_keywords: usize,

    /// Content similarity considers contexts updated within this window.
    pub similarity_window_days: i64,

    /// Temporal proximity looks back this far for the latest context.
    pub temporal_lookback_days: i64,

    /// Window scanned when collecting a user's live contexts.
    pub live_window_days: i64,

    /// Recency decay steps, youngest first.
    pub temporal_bands: Vec<TemporalBand>,

    /// Confidence for contexts older than every band.
    pub temporal_floor: f32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.6,
            reference_confidence: 0.95,
            annotation_confidence: 0.7,
            template_match_threshold: 0.7,
            template_ambiguous_confidence: 0.4,
            ambiguous_confidence: 0.3,
            min_similarity_text_len: 20,
            max_keywords: 20,
            similarity_window_days: 7,
            temporal_lookback_days: 30,
            live_window_days: 30,
            temporal_bands: vec![
                TemporalBand::new(1, 0.8),
                TemporalBand::new(6, 0.6),
                TemporalBand::new(24, 0.4),
            ],
            temporal_floor: 0.2,
        }
    }
}

impl RecoveryConfig {
    /// Validate threshold ranges and band ordering.
    pub fn validate(&self) -> Result<(), String> {
        let unit_fields = [
            ("acceptance_threshold", self.acceptance_threshold),
            ("reference_confidence", self.reference_confidence),
            ("annotation_confidence", self.annotation_confidence),
            ("template_match_threshold", self.template_match_threshold),
            (
                "template_ambiguous_confidence",
                self.template_ambiguous_confidence,
            ),
            ("ambiguous_confidence", self.ambiguous_confidence),
            ("temporal_floor", self.temporal_floor),
        ];
        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} ({value}) must be within [0, 1]"));
            }
        }

        if self.max_keywords == 0 {
            return Err("max_keywords must be > 0".to_string());
        }
        for (name, days) in [
            ("similarity_window_days", self.similarity_window_days),
            ("temporal_lookback_days", self.temporal_lookback_days),
            ("live_window_days", self.live_window_days),
        ] {
            if days <= 0 {
                return Err(format!("{name} must be > 0"));
            }
        }

        if self.temporal_bands.is_empty() {
            return Err("temporal_bands must not be empty".to_string());
        }
        for pair in self.temporal_bands.windows(2) {
            if pair[1].max_age_hours <= pair[0].max_age_hours {
                return Err("temporal_bands must strictly increase in max_age_hours".to_string());
            }
            if pair[1].confidence > pair[0].confidence {
                return Err("temporal_bands confidence must not increase with age".to_string());
            }
        }
        for band in &self.temporal_bands {
            if band.max_age_hours <= 0 {
                return Err("temporal band max_age_hours must be > 0".to_string());
            }
            if !(0.0..=1.0).contains(&band.confidence) {
                return Err("temporal band confidence must be within [0, 1]".to_string());
            }
        }
        if self.temporal_floor > self.temporal_bands[self.temporal_bands.len() - 1].confidence {
            return Err("temporal_floor must not exceed the oldest band's confidence".to_string());
        }

        Ok(())
    }

    /// Parse overrides from TOML; absent keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("parsing recovery config")?;
        config.validate().map_err(|e| anyhow!(e))?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading recovery config {}", path.display()))?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        assert!(RecoveryConfig::default().validate().is_ok());
    }

    #[test]
    fn thresholds_outside_unit_interval_are_rejected() {
        let mut config = RecoveryConfig::default();
        config.acceptance_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = RecoveryConfig::default();
        config.ambiguous_confidence = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bands_must_decay() {
        let mut config = RecoveryConfig::default();
        config.temporal_bands = vec![TemporalBand::new(1, 0.4), TemporalBand::new(6, 0.8)];
        assert!(config.validate().is_err());

        let mut config = RecoveryConfig::default();
        config.temporal_bands = vec![TemporalBand::new(6, 0.8), TemporalBand::new(1, 0.6)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let config = RecoveryConfig::from_toml_str(
            r#"
            acceptance_threshold = 0.5
            similarity_window_days = 14
            "#,
        )
        .unwrap();

        assert_eq!(config.acceptance_threshold, 0.5);
        assert_eq!(config.similarity_window_days, 14);
        // Untouched keys keep their defaults.
        assert_eq!(config.reference_confidence, 0.95);
        assert_eq!(config.temporal_bands.len(), 3);
    }

    #[test]
    fn invalid_toml_values_fail_to_load() {
        let err = RecoveryConfig::from_toml_str("acceptance_threshold = 2.0").unwrap_err();
        assert!(err.to_string().contains("acceptance_threshold"));
    }

    #[test]
    fn load_reads_overrides_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recovery.toml");
        std::fs::write(&path, "temporal_floor = 0.1\nmax_keywords = 30\n").unwrap();

        let config = RecoveryConfig::load(&path).unwrap();
        assert_eq!(config.temporal_floor, 0.1);
        assert_eq!(config.max_keywords, 30);
    }
}
