//! Configuration system for wordwise.
//!
//! All model constants live in [`SchedulerParams`], an immutable value that
//! is handed to the decay model and update policy at construction time.
//! Nothing reads parameters from global state, so tests and deployments can
//! run side by side with different parameter sets.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{WordwiseError, WordwiseResult};

/// Lower bound on `interval_difficulty_weight` that keeps intervals
/// non-increasing in difficulty over the whole normalized range: 1 / (2 ln 2).
pub const MIN_INTERVAL_DIFFICULTY_WEIGHT: f64 = 0.721_347_520_444_481_7;

/// Parameters of the memory model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerParams {
    /// Lowest stability a state can hold, in days.
    pub min_stability: f64,
    /// Highest stability a state can hold, in days.
    pub max_stability: f64,
    /// Easiest difficulty.
    pub min_difficulty: f64,
    /// Hardest difficulty.
    pub max_difficulty: f64,
    /// Difficulty assumed for an item before its first review.
    pub initial_difficulty: f64,
    /// Stability after a forgotten (rating 1) review.
    pub reset_stability: f64,
    /// First-review stability for Hard, Good and Easy.
    pub initial_stability: [f64; 3],
    /// Difficulty moves by `-difficulty_step * (rating - 3)` on each review.
    pub difficulty_step: f64,
    /// g1: scales stability growth through `exp(g1)`.
    pub growth_rate: f64,
    /// g2: larger stabilities grow proportionally less, via `S^(-g2)`.
    pub stability_damping: f64,
    /// g3: weight of forgetting in `exp((1 - R) * g3) - 1`.
    pub retrievability_gain: f64,
    /// Growth is proportional to `growth_difficulty_ceiling - difficulty`.
    pub growth_difficulty_ceiling: f64,
    /// Growth multiplier for Hard reviews.
    pub hard_penalty: f64,
    /// Growth multiplier for Easy reviews.
    pub easy_bonus: f64,
    /// Retrievability reached after exactly `stability` days.
    pub reference_retention: f64,
    /// k1 in `S * exp(k1 * (1 - d)) * ln(d + 2) * k2`.
    pub interval_difficulty_weight: f64,
    /// k2 in `S * exp(k1 * (1 - d)) * ln(d + 2) * k2`.
    pub interval_scale: f64,
    /// Intervals never drop below this many days.
    pub min_interval_days: f64,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            min_stability: 0.1,
            max_stability: 36_500.0,
            min_difficulty: 1.0,
            max_difficulty: 10.0,
            initial_difficulty: 5.0,
            reset_stability: 0.4,
            initial_stability: [0.6, 2.4, 5.8],
            difficulty_step: 1.0,
            growth_rate: 1.49,
            stability_damping: 0.14,
            retrievability_gain: 0.94,
            growth_difficulty_ceiling: 11.0,
            hard_penalty: 0.29,
            easy_bonus: 2.61,
            reference_retention: 0.9,
            interval_difficulty_weight: 0.94,
            interval_scale: 0.68,
            min_interval_days: 1.0,
        }
    }
}

impl SchedulerParams {
    /// Check that the parameters describe a well-formed model.
    pub fn validate(&self) -> WordwiseResult<()> {
        let all = [
            self.min_stability,
            self.max_stability,
            self.min_difficulty,
            self.max_difficulty,
            self.initial_difficulty,
            self.reset_stability,
            self.difficulty_step,
            self.growth_rate,
            self.stability_damping,
            self.retrievability_gain,
            self.growth_difficulty_ceiling,
            self.hard_penalty,
            self.easy_bonus,
            self.reference_retention,
            self.interval_difficulty_weight,
            self.interval_scale,
            self.min_interval_days,
        ];
        if all.iter().chain(self.initial_stability.iter()).any(|v| !v.is_finite()) {
            return Err(invalid("all parameters must be finite numbers"));
        }

        if self.min_stability <= 0.0 || self.min_stability >= self.max_stability {
            return Err(invalid("stability bounds must satisfy 0 < min_stability < max_stability"));
        }
        if self.min_difficulty >= self.max_difficulty {
            return Err(invalid("min_difficulty must be below max_difficulty"));
        }
        if !(self.min_difficulty..=self.max_difficulty).contains(&self.initial_difficulty) {
            return Err(invalid("initial_difficulty must lie within the difficulty bounds"));
        }
        if self.growth_difficulty_ceiling < self.max_difficulty {
            return Err(invalid("growth_difficulty_ceiling must be at least max_difficulty"));
        }

        let stability_range = self.min_stability..=self.max_stability;
        if !stability_range.contains(&self.reset_stability)
            || !self.initial_stability.iter().all(|s| stability_range.contains(s))
        {
            return Err(invalid("reset and initial stabilities must lie within the stability bounds"));
        }
        if !self.initial_stability.windows(2).all(|w| w[0] <= w[1]) {
            return Err(invalid("initial_stability must be ordered Hard <= Good <= Easy"));
        }

        if self.hard_penalty <= 0.0 || self.hard_penalty > 1.0 {
            return Err(invalid("hard_penalty must be in (0, 1]"));
        }
        if self.easy_bonus < 1.0 {
            return Err(invalid("easy_bonus must be at least 1"));
        }
        if self.difficulty_step < 0.0
            || self.growth_rate < 0.0
            || self.stability_damping < 0.0
            || self.retrievability_gain < 0.0
        {
            return Err(invalid("step and growth parameters must be non-negative"));
        }

        if self.reference_retention <= 0.0 || self.reference_retention >= 1.0 {
            return Err(invalid("reference_retention must be in (0, 1)"));
        }
        if self.interval_difficulty_weight < MIN_INTERVAL_DIFFICULTY_WEIGHT {
            return Err(invalid(format!(
                "interval_difficulty_weight must be at least {:.4} to keep intervals monotone in difficulty",
                MIN_INTERVAL_DIFFICULTY_WEIGHT
            )));
        }
        if self.interval_scale <= 0.0 || self.min_interval_days <= 0.0 {
            return Err(invalid("interval_scale and min_interval_days must be positive"));
        }

        Ok(())
    }

    /// Clamp a stability into the configured bounds.
    pub fn clamp_stability(&self, stability: f64) -> f64 {
        stability.clamp(self.min_stability, self.max_stability)
    }

    /// Clamp a difficulty into the configured bounds.
    pub fn clamp_difficulty(&self, difficulty: f64) -> f64 {
        difficulty.clamp(self.min_difficulty, self.max_difficulty)
    }
}

fn invalid(message: impl Into<String>) -> WordwiseError {
    WordwiseError::configuration(message)
}

/// Persistence configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the SQLite database file.
    pub db_path: PathBuf,
    /// How long a writer waits for a lock held by another connection.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let wordwise_dir = dirs::home_dir()
            .map(|h| h.join(".wordwise"))
            .unwrap_or_else(|| PathBuf::from(".wordwise"));

        Self {
            db_path: wordwise_dir.join("wordwise.db"),
            busy_timeout_ms: 5_000,
        }
    }
}

/// Next-item selection configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Seed for picking among new items. `None` seeds from entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Main wordwise configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordwiseConfig {
    /// Memory model parameters.
    pub scheduler: SchedulerParams,
    /// Storage settings.
    pub store: StoreConfig,
    /// Selection settings.
    pub selection: SelectionConfig,
}

impl WordwiseConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> WordwiseResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| WordwiseError::configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| WordwiseError::configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| WordwiseError::configuration(e.to_string()))?,
            _ => {
                return Err(WordwiseError::configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml",
                ))
            }
        };

        config.scheduler.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `WORDWISE_*` environment variables.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("WORDWISE_DB_PATH") {
            self.store.db_path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var("WORDWISE_BUSY_TIMEOUT_MS") {
            match raw.parse() {
                Ok(ms) => self.store.busy_timeout_ms = ms,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid WORDWISE_BUSY_TIMEOUT_MS"),
            }
        }
        if let Ok(raw) = std::env::var("WORDWISE_SEED") {
            match raw.parse() {
                Ok(seed) => self.selection.seed = Some(seed),
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid WORDWISE_SEED"),
            }
        }
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> WordwiseConfigBuilder {
        WordwiseConfigBuilder::default()
    }
}

/// Builder for WordwiseConfig.
#[derive(Default)]
pub struct WordwiseConfigBuilder {
    config: WordwiseConfig,
}

impl WordwiseConfigBuilder {
    /// Set the memory model parameters.
    pub fn scheduler(mut self, params: SchedulerParams) -> Self {
        self.config.scheduler = params;
        self
    }

    /// Set the database path.
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.db_path = path.into();
        self
    }

    /// Set the SQLite busy timeout.
    pub fn busy_timeout_ms(mut self, ms: u64) -> Self {
        self.config.store.busy_timeout_ms = ms;
        self
    }

    /// Seed new-item selection.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.selection.seed = Some(seed);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> WordwiseConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_params_are_valid() {
        SchedulerParams::default().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_flat_interval_weight() {
        let params = SchedulerParams {
            interval_difficulty_weight: 0.5,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(WordwiseError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_unordered_initial_stability() {
        let params = SchedulerParams {
            initial_stability: [3.0, 2.0, 5.0],
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bonus_below_one() {
        let params = SchedulerParams {
            easy_bonus: 0.8,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = SchedulerParams {
            hard_penalty: 1.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let params = SchedulerParams {
            growth_rate: f64::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_clamps() {
        let params = SchedulerParams::default();
        assert_eq!(params.clamp_stability(0.0), 0.1);
        assert_eq!(params.clamp_stability(1e9), 36_500.0);
        assert_eq!(params.clamp_difficulty(-3.0), 1.0);
        assert_eq!(params.clamp_difficulty(12.0), 10.0);
    }

    #[test]
    fn test_from_toml_file_with_partial_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[scheduler]\ndifficulty_step = 0.5\n\n[store]\ndb_path = \"/tmp/ww.db\"\n\n[selection]\nseed = 7"
        )
        .unwrap();

        let config = WordwiseConfig::from_file(file.path()).unwrap();
        assert_eq!(config.scheduler.difficulty_step, 0.5);
        assert_eq!(config.scheduler.reset_stability, 0.4);
        assert_eq!(config.store.db_path, PathBuf::from("/tmp/ww.db"));
        assert_eq!(config.selection.seed, Some(7));
    }

    #[test]
    fn test_from_file_rejects_invalid_params() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"scheduler": {{"min_stability": 0.0}}}}"#).unwrap();

        assert!(matches!(
            WordwiseConfig::from_file(file.path()),
            Err(WordwiseError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(WordwiseConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_builder() {
        let config = WordwiseConfig::builder()
            .db_path("/tmp/test.db")
            .busy_timeout_ms(100)
            .seed(42)
            .build();

        assert_eq!(config.store.db_path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.store.busy_timeout_ms, 100);
        assert_eq!(config.selection.seed, Some(42));
    }
}
