use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Which definitions of `mom_jt`, relative strength and score weights a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MetricScheme {
    #[default]
    /// Rolling mean of 20-session returns, deviation from the full-sample mean, equal weights.
    Classic,
    /// 120-session return, deviation from the 130-session average, 0.4/0.3/0.2/0.1 weights.
    Weighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScoreWeights {
    pub mom260: f64,
    pub mom_jt: f64,
    pub relative_strength: f64,
    pub volume: f64,
}

impl ScoreWeights {
    pub const EQUAL: ScoreWeights = ScoreWeights {
        mom260: 1.0,
        mom_jt: 1.0,
        relative_strength: 1.0,
        volume: 1.0,
    };

    pub const TIERED: ScoreWeights = ScoreWeights {
        mom260: 0.4,
        mom_jt: 0.3,
        relative_strength: 0.2,
        volume: 0.1,
    };

    pub fn for_scheme(scheme: MetricScheme) -> Self {
        match scheme {
            MetricScheme::Classic => Self::EQUAL,
            MetricScheme::Weighted => Self::TIERED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    pub buy: f64,
    pub hold: f64,
}

impl SignalThresholds {
    pub const CLASSIC: SignalThresholds = SignalThresholds { buy: 2.0, hold: 0.0 };
    /// Classic buy level scaled by the weight sum (1.0 against 4.0), so a score
    /// built from the same components crosses it in the same situations.
    pub const WEIGHTED: SignalThresholds = SignalThresholds { buy: 0.5, hold: 0.0 };

    pub fn for_scheme(scheme: MetricScheme) -> Self {
        match scheme {
            MetricScheme::Classic => Self::CLASSIC,
            MetricScheme::Weighted => Self::WEIGHTED,
        }
    }
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self::CLASSIC
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) MomentumScreener/0.1".to_string(),
            timeout_seconds: 15,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub db_path: String,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_path: "cache.db".to_string(),
            ttl_seconds: 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scheme: MetricScheme,
    /// Overrides the scheme's default weights when present.
    pub weights: Option<ScoreWeights>,
    /// Overrides the scheme's default thresholds when present.
    pub thresholds: Option<SignalThresholds>,
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub output_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scheme: MetricScheme::default(),
            weights: None,
            thresholds: None,
            source: SourceConfig::default(),
            cache: CacheConfig::default(),
            output_path: "momentum_results.csv".to_string(),
        }
    }
}

impl AppConfig {
    pub fn effective_weights(&self) -> ScoreWeights {
        self.weights.unwrap_or_else(|| ScoreWeights::for_scheme(self.scheme))
    }

    pub fn effective_thresholds(&self) -> SignalThresholds {
        self.thresholds.unwrap_or_else(|| SignalThresholds::for_scheme(self.scheme))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.effective_thresholds();
        if !t.buy.is_finite() || !t.hold.is_finite() || t.buy < t.hold {
            return Err(ConfigError::Invalid(format!(
                "buy threshold ({}) must be finite and not below hold threshold ({})",
                t.buy, t.hold
            )));
        }
        if let Some(w) = self.weights {
            let all = [w.mom260, w.mom_jt, w.relative_strength, w.volume];
            if all.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::Invalid("score weights must be finite".into()));
            }
        }
        Ok(())
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Loads `path` if it exists, otherwise falls back to built-in defaults.
pub fn load_config_or_default(path: &str) -> Result<AppConfig, ConfigError> {
    if Path::new(path).exists() {
        load_config(path)
    } else {
        tracing::info!("No config file at {}, using defaults", path);
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.scheme, MetricScheme::Classic);
        assert_eq!(cfg.effective_thresholds(), SignalThresholds { buy: 2.0, hold: 0.0 });
        assert_eq!(cfg.cache.ttl_seconds, 3600);
        assert_eq!(cfg.effective_weights(), ScoreWeights::EQUAL);
    }

    #[test]
    fn weighted_scheme_uses_tiered_weights() {
        let cfg: AppConfig = serde_json::from_str(r#"{"scheme": "weighted"}"#).unwrap();
        assert_eq!(cfg.effective_weights(), ScoreWeights::TIERED);
        assert_eq!(cfg.effective_thresholds(), SignalThresholds { buy: 0.5, hold: 0.0 });
    }

    #[test]
    fn explicit_thresholds_override_scheme() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"scheme": "weighted", "thresholds": {"buy": 1.5}}"#).unwrap();
        assert_eq!(cfg.effective_thresholds(), SignalThresholds { buy: 1.5, hold: 0.0 });
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn explicit_weights_override_scheme() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"scheme": "weighted", "weights": {"mom260": 0.5, "mom_jt": 0.5, "relative_strength": 0.0, "volume": 0.0}}"#,
        )
        .unwrap();
        assert_eq!(cfg.effective_weights().mom260, 0.5);
        assert_eq!(cfg.effective_weights().volume, 0.0);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"thresholds": {"buy": -1.0, "hold": 0.0}}"#).unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load_config_or_default("definitely-not-here/config.json").unwrap();
        assert_eq!(cfg.output_path, "momentum_results.csv");
    }
}
