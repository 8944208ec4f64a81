//! Skill evaluation configuration.

use crate::error::SkillError;

/// Configuration for skill evaluation and confidence tiers.
#[derive(Debug, Clone)]
pub struct SkillConfig {
    min_pairs: usize,
    high_confidence: f64,
    medium_confidence: f64,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            min_pairs: 11,
            high_confidence: 0.5,
            medium_confidence: 0.3,
        }
    }
}

impl SkillConfig {
    /// Set the minimum number of matched pairs for a skill cell.
    pub fn with_min_pairs(mut self, n: usize) -> Self {
        self.min_pairs = n;
        self
    }

    /// Set the correlation above which confidence is high.
    pub fn with_high_confidence(mut self, r: f64) -> Self {
        self.high_confidence = r;
        self
    }

    /// Set the correlation above which confidence is medium.
    pub fn with_medium_confidence(mut self, r: f64) -> Self {
        self.medium_confidence = r;
        self
    }

    /// Returns the minimum number of matched pairs.
    pub fn min_pairs(&self) -> usize {
        self.min_pairs
    }

    /// Returns the high-confidence correlation threshold.
    pub fn high_confidence(&self) -> f64 {
        self.high_confidence
    }

    /// Returns the medium-confidence correlation threshold.
    pub fn medium_confidence(&self) -> f64 {
        self.medium_confidence
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::Validation`] listing every failed check.
    pub fn validate(&self) -> Result<(), SkillError> {
        let mut issues = Vec::new();
        if self.min_pairs < 3 {
            issues.push(format!(
                "min_pairs must be at least 3, got {}",
                self.min_pairs
            ));
        }
        for (name, r) in [
            ("high_confidence", self.high_confidence),
            ("medium_confidence", self.medium_confidence),
        ] {
            if !(-1.0..=1.0).contains(&r) {
                issues.push(format!("{name} must be in -1..=1, got {r}"));
            }
        }
        if self.medium_confidence > self.high_confidence {
            issues.push(format!(
                "medium_confidence ({}) exceeds high_confidence ({})",
                self.medium_confidence, self.high_confidence
            ));
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(SkillError::Validation {
                count: issues.len(),
                details: issues.join("; "),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = SkillConfig::default();
        assert_eq!(config.min_pairs(), 11);
        assert_eq!(config.high_confidence(), 0.5);
        assert_eq!(config.medium_confidence(), 0.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = SkillConfig::default()
            .with_min_pairs(15)
            .with_high_confidence(0.6)
            .with_medium_confidence(0.4);
        assert_eq!(config.min_pairs(), 15);
        assert_eq!(config.high_confidence(), 0.6);
        assert_eq!(config.medium_confidence(), 0.4);
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let config = SkillConfig::default()
            .with_min_pairs(2)
            .with_high_confidence(0.2)
            .with_medium_confidence(f64::NAN);
        match config.validate() {
            Err(SkillError::Validation { count, .. }) => assert_eq!(count, 2),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = SkillConfig::default().with_medium_confidence(0.7);
        assert!(config.validate().is_err());
    }
}
