//! Tunable parameters for capture and relocation.

use serde::{Deserialize, Serialize};

/// Parameters threaded through capture and resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSettings {
    /// Characters of context captured on each side of a span (default: 20)
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Fraction of half the span length kept as an inner sample (default: 0.15)
    #[serde(default = "default_percent_storage")]
    pub percent_storage: f64,

    /// Maximum drift accepted when recovering a span from samples (default: 5)
    #[serde(default = "default_fallback_tolerance")]
    pub fallback_tolerance: usize,

    /// Upper bound on the fuzzy matcher's n-gram size (default: 20)
    #[serde(default = "default_max_shingle_size")]
    pub max_shingle_size: usize,

    /// Minimum shingle hits for a fuzzy match window (default: 1)
    #[serde(default = "default_min_shingle_hits")]
    pub min_shingle_hits: usize,
}

fn default_window_size() -> usize {
    20
}
fn default_percent_storage() -> f64 {
    0.15
}
fn default_fallback_tolerance() -> usize {
    5
}
fn default_max_shingle_size() -> usize {
    20
}
fn default_min_shingle_hits() -> usize {
    1
}

impl Default for AnchorSettings {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            percent_storage: default_percent_storage(),
            fallback_tolerance: default_fallback_tolerance(),
            max_shingle_size: default_max_shingle_size(),
            min_shingle_hits: default_min_shingle_hits(),
        }
    }
}

impl AnchorSettings {
    /// Settings with a different context window
    pub fn with_window(window_size: usize) -> Self {
        Self {
            window_size,
            ..Default::default()
        }
    }

    /// Inner sample length for a span of `span_len` characters.
    ///
    /// Zero when the span is not longer than the context window, in which
    /// case the whole span text is stored instead. Never more than half the
    /// span, so the two samples cannot overlap.
    pub fn sample_length(&self, span_len: usize) -> usize {
        if span_len <= self.window_size {
            return 0;
        }
        let half = span_len / 2;
        ((half as f64 * self.percent_storage).floor() as usize).min(half)
    }

    /// Check values that can come from a config file
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.percent_storage) {
            return Err(format!(
                "percent_storage must be between 0.0 and 1.0, got {}",
                self.percent_storage
            ));
        }
        if self.max_shingle_size == 0 {
            return Err("max_shingle_size must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AnchorSettings::default();
        assert_eq!(settings.window_size, 20);
        assert_eq!(settings.percent_storage, 0.15);
        assert_eq!(settings.fallback_tolerance, 5);
        assert_eq!(settings.max_shingle_size, 20);
        assert_eq!(settings.min_shingle_hits, 1);
    }

    #[test]
    fn test_sample_length() {
        let settings = AnchorSettings::default();
        assert_eq!(settings.sample_length(20), 0);
        // 21 / 2 = 10 -> floor(1.5) = 1
        assert_eq!(settings.sample_length(21), 1);
        // 200 / 2 = 100 -> 15
        assert_eq!(settings.sample_length(200), 15);

        // Long enough to pass the gate but too short for a sample
        let narrow = AnchorSettings::with_window(4);
        assert_eq!(narrow.sample_length(5), 0);
    }

    #[test]
    fn test_sample_length_never_exceeds_half_span() {
        let settings = AnchorSettings {
            percent_storage: 3.0,
            ..Default::default()
        };
        assert_eq!(settings.sample_length(30), 15);
        assert_eq!(settings.sample_length(31), 15);
    }

    #[test]
    fn test_validate() {
        assert!(AnchorSettings::default().validate().is_ok());

        let too_large = AnchorSettings {
            percent_storage: 2.5,
            ..Default::default()
        };
        assert!(too_large.validate().unwrap_err().contains("percent_storage"));

        let negative = AnchorSettings {
            percent_storage: -0.1,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let no_shingles = AnchorSettings {
            max_shingle_size: 0,
            ..Default::default()
        };
        assert!(no_shingles.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let settings: AnchorSettings = serde_yaml::from_str("window_size: 32\n").unwrap();
        assert_eq!(settings.window_size, 32);
        assert_eq!(settings.fallback_tolerance, 5);
    }
}
