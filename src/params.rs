//! Parameter metadata for the search engine
//!
//! This module describes every scalar [`EngineConfig`] parameter, enabling:
//! - Parameter sweeps over a grid
//! - Parameter documentation
//! - Building a config from loosely typed key/value input
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use wavescan::EngineConfig;
//!
//! for param in EngineConfig::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let params = HashMap::from([("up_to", 3.0), ("min_age", 0.7)]);
//! let config = EngineConfig::with_params(&params).unwrap();
//! assert_eq!(config.up_to, 3);
//! ```

use std::collections::HashMap;

use crate::{EngineConfig, Period, Ratio, Result, WaveError};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Score threshold in 0.0..=1.0
  Ratio,
  /// Positive integer
  Period,
  /// Non-negative integer
  Count,
}

/// Metadata for a single engine parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "pivot_window")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Range for sweeps: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  /// Create a new ParamMeta for a Ratio parameter
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  /// Create a new ParamMeta for a Period parameter
  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  /// Create a new ParamMeta for a Count parameter
  pub const fn count(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Count, default, range, description }
  }

  /// Generate all values for a sweep
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(WaveError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Period if value < 1.0 || value.fract() != 0.0 => {
        Err(WaveError::InvalidValue("Period must be a positive integer"))
      },
      ParamType::Count if value < 0.0 || value.fract() != 0.0 => {
        Err(WaveError::InvalidValue("Count must be a non-negative integer"))
      },
      _ => Ok(()),
    }
  }
}

/// Every scalar engine parameter with its default and sweep range
pub const ENGINE_PARAMS: &[ParamMeta] = &[
  ParamMeta::period("up_to", 5.0, (1.0, 8.0, 1.0), "Exclusive bound on extrema skipped per wave"),
  ParamMeta::count(
    "range",
    0.0,
    (0.0, 8.0, 1.0),
    "Window around the first skip for the ranged generator; 0 selects the full generator",
  ),
  ParamMeta::period("pivot_window", 5.0, (2.0, 30.0, 1.0), "Bars on each side confirming a pivot"),
  ParamMeta::ratio("min_proportion", 0.5, (0.0, 1.0, 0.05), "Proportion score a match must exceed"),
  ParamMeta::ratio("min_age", 0.5, (0.0, 1.0, 0.05), "Age score a match must exceed"),
  ParamMeta::period("top_k", 5.0, (1.0, 50.0, 1.0), "Matches kept per series"),
];

impl EngineConfig {
  /// Returns metadata for all scalar parameters
  pub fn param_meta() -> &'static [ParamMeta] {
    ENGINE_PARAMS
  }

  /// Config from key/value pairs; missing keys keep their defaults
  pub fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    for (key, value) in params {
      let meta = ENGINE_PARAMS
        .iter()
        .find(|m| m.name == *key)
        .ok_or_else(|| WaveError::InvalidConfig(format!("unknown parameter '{key}'")))?;
      meta.validate(*value)?;
    }

    let defaults = EngineConfig::default();
    let range = get_count(params, "range", 0)?;
    let config = EngineConfig {
      up_to: get_period(params, "up_to", defaults.up_to)?.get(),
      range: (range > 0).then_some(range),
      pivot_window: get_period(params, "pivot_window", defaults.pivot_window)?.get(),
      min_proportion: get_ratio(params, "min_proportion", defaults.min_proportion)?.get(),
      min_age: get_ratio(params, "min_age", defaults.min_age)?.get(),
      top_k: get_period(params, "top_k", defaults.top_k)?.get(),
      ..defaults
    };
    config.validate()?;
    Ok(config)
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  Period::new(value as usize)
}

/// Helper to get a non-negative integer from params with default fallback
pub fn get_count(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<usize> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  if value < 0.0 || value.fract() != 0.0 {
    return Err(WaveError::InvalidValue("Count must be a non-negative integer"));
  }
  Ok(value as usize)
}

// ============================================================
// TESTS
// ============================================================
