use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ReconError;

/// Built-in configuration profile. `Accuracy` casts a wide net; `Speed`
/// narrows windows and raises the text bar for large inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Speed,
    Accuracy,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "speed" => Ok(Self::Speed),
            "accuracy" => Ok(Self::Accuracy),
            other => Err(format!("unknown mode '{other}' (expected speed or accuracy)")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Speed => write!(f, "speed"),
            Self::Accuracy => write!(f, "accuracy"),
        }
    }
}

/// Tolerances and windows driving the match cascade. Amount tolerances are
/// integer cents; date windows are day counts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    /// Amount tolerance for every pass except the loose-amount pass.
    pub amount_tolerance_cents: i64,
    /// Amount tolerance for the loose-amount pass only (fee/rounding
    /// variants backed by strong text).
    pub amount_tolerance_loose_cents: i64,
    /// Day window for the strict and loose-amount passes, and for
    /// combination pools.
    pub date_window_strict: i64,
    /// Day window for the fuzzy-date pass.
    pub date_window_loose: i64,
    /// Day window for the reference-id pass.
    pub date_window_reference: i64,
    /// Minimum raw text similarity for the fuzzy-date pass.
    pub fuzzy_text_threshold: f64,
    /// Maximum subset size in combination passes. 0 disables them.
    pub max_combination_depth: usize,
}

impl MatchConfig {
    pub fn accuracy() -> Self {
        Self {
            amount_tolerance_cents: 5,
            amount_tolerance_loose_cents: 150,
            date_window_strict: 3,
            date_window_loose: 10,
            date_window_reference: 45,
            fuzzy_text_threshold: 0.60,
            max_combination_depth: 4,
        }
    }

    pub fn speed() -> Self {
        Self {
            amount_tolerance_cents: 5,
            amount_tolerance_loose_cents: 150,
            date_window_strict: 1,
            date_window_loose: 3,
            date_window_reference: 10,
            fuzzy_text_threshold: 0.85,
            max_combination_depth: 2,
        }
    }

    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Speed => Self::speed(),
            Mode::Accuracy => Self::accuracy(),
        }
    }

    /// Parse a custom profile from TOML and validate it.
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.amount_tolerance_cents < 0 || self.amount_tolerance_loose_cents < 0 {
            return Err(ReconError::ConfigValidation(
                "amount tolerances must be non-negative".into(),
            ));
        }
        if self.amount_tolerance_loose_cents < self.amount_tolerance_cents {
            return Err(ReconError::ConfigValidation(format!(
                "loose amount tolerance ({}) must be >= strict tolerance ({})",
                self.amount_tolerance_loose_cents, self.amount_tolerance_cents
            )));
        }
        if self.date_window_strict < 0 || self.date_window_loose < 0 || self.date_window_reference < 0
        {
            return Err(ReconError::ConfigValidation(
                "date windows must be non-negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_text_threshold) {
            return Err(ReconError::ConfigValidation(format!(
                "fuzzy_text_threshold must be in [0, 1], got {}",
                self.fuzzy_text_threshold
            )));
        }
        Ok(())
    }
}
