//! Solver configuration shared by all backends.

use crate::error::SolverError;
use std::path::PathBuf;

/// Default model name handed to engines that label their models.
pub const DEFAULT_MODEL_NAME: &str = "mipgate";

/// Configuration options applied on the next `optimize`.
///
/// `None` leaves the engine default in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverConfig {
    /// Wall-clock limit in seconds. `None` means no limit.
    pub time_limit: Option<f64>,
    /// Show engine progress output on the console.
    pub show_log: Option<bool>,
    /// Write engine progress output to this file.
    pub log_file: Option<PathBuf>,
    /// Relative MIP gap tolerance.
    pub mip_gap: Option<f64>,
    /// Number of engine threads.
    pub threads: Option<u32>,
    /// Name given to the engine model.
    pub model_name: Option<String>,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_show_log(mut self, enabled: bool) -> Self {
        self.show_log = Some(enabled);
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    pub fn show_log_enabled(&self) -> bool {
        self.show_log.unwrap_or(false)
    }

    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL_NAME)
    }

    /// Check if this configuration is completely empty (all defaults).
    pub fn is_empty(&self) -> bool {
        self.time_limit.is_none()
            && self.show_log.is_none()
            && self.log_file.is_none()
            && self.mip_gap.is_none()
            && self.threads.is_none()
            && self.model_name.is_none()
    }

    /// Reject values no engine would accept.
    pub fn validate(&self) -> Result<(), SolverError> {
        if let Some(limit) = self.time_limit {
            validate_time_limit(limit)?;
        }
        if let Some(gap) = self.mip_gap {
            if gap.is_nan() || gap < 0.0 {
                return Err(SolverError::InvalidMipGap(gap));
            }
        }
        Ok(())
    }
}

/// A time limit is valid if it is non-negative; `+inf` means no limit.
pub fn validate_time_limit(seconds: f64) -> Result<(), SolverError> {
    if seconds.is_nan() || seconds < 0.0 {
        return Err(SolverError::InvalidTimeLimit(seconds));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_is_empty() {
        let config = SolverConfig::new();
        assert!(config.is_empty());
        assert!(!config.show_log_enabled());
        assert_eq!(config.model_name(), DEFAULT_MODEL_NAME);
    }

    #[test]
    fn builder_sets_every_field() {
        let config = SolverConfig::new()
            .with_time_limit(60.0)
            .with_show_log(true)
            .with_log_file("solve.log")
            .with_mip_gap(0.01)
            .with_threads(4)
            .with_model_name("knapsack");

        assert!(!config.is_empty());
        assert_eq!(config.time_limit, Some(60.0));
        assert!(config.show_log_enabled());
        assert_eq!(config.log_file, Some(PathBuf::from("solve.log")));
        assert_eq!(config.mip_gap, Some(0.01));
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.model_name(), "knapsack");
    }

    #[test]
    fn validate_rejects_negative_time_limit() {
        let config = SolverConfig::new().with_time_limit(-1.0);
        assert_eq!(config.validate(), Err(SolverError::InvalidTimeLimit(-1.0)));
        assert!(SolverConfig::new().with_time_limit(f64::NAN).validate().is_err());
    }

    #[test]
    fn validate_accepts_zero_and_infinite_limits() {
        assert!(validate_time_limit(0.0).is_ok());
        assert!(validate_time_limit(f64::INFINITY).is_ok());
    }

    #[test]
    fn validate_rejects_negative_gap() {
        assert!(SolverConfig::new().with_mip_gap(-0.1).validate().is_err());
        assert!(SolverConfig::new().with_mip_gap(0.0).validate().is_ok());
    }
}
