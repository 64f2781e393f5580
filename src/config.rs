// src/config.rs
// =============================================================================
// Probe configuration.
//
// The CLI hands us plain numbers (seconds as floats, counts as integers).
// ProbeConfig turns them into typed values once, validates them, and is then
// shared read-only by the transport, the engine and the scheduler.
//
// Rust concepts:
// - Duration: typed time spans instead of raw floats
// - Result<T, E>: invalid settings are rejected before any probing starts
// =============================================================================

use crate::error::ConfigError;
use std::time::Duration;

/// Settings for one probing run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Maximum number of probes in flight at once
    pub concurrency: usize,
    /// Total timeout for a single attempt
    pub timeout: Duration,
    /// Extra attempt cycles after the first one
    pub retries: u32,
    /// Try HEAD before GET in every cycle
    pub use_head: bool,
    /// Upper bound of the random delay before each cycle (zero disables it)
    pub jitter: Duration,
    /// Allow HTTP/2 negotiation (otherwise HTTP/1.1 only)
    pub http2: bool,
    /// Proxy URL handed verbatim to the transport
    pub proxy: Option<String>,
    /// Retry 4xx/5xx responses the same way as transport failures
    pub retry_http_errors: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            concurrency: 20,
            timeout: Duration::from_secs(15),
            retries: 2,
            use_head: true,
            jitter: Duration::ZERO,
            http2: false,
            proxy: None,
            retry_http_errors: true,
        }
    }
}

impl ProbeConfig {
    /// Builds a config from CLI-style values (seconds as floats).
    ///
    /// Fails on a zero concurrency, a non-positive or non-finite timeout, or a
    /// negative or non-finite jitter.
    pub fn from_secs(
        concurrency: usize,
        timeout_secs: f64,
        retries: u32,
        use_head: bool,
        jitter_secs: f64,
        http2: bool,
        proxy: Option<String>,
    ) -> Result<Self, ConfigError> {
        if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
            return Err(ConfigError::InvalidTimeout(timeout_secs));
        }
        if !jitter_secs.is_finite() || jitter_secs < 0.0 {
            return Err(ConfigError::InvalidJitter(jitter_secs));
        }
        let timeout = Duration::try_from_secs_f64(timeout_secs)
            .map_err(|_| ConfigError::InvalidTimeout(timeout_secs))?;
        let jitter = Duration::try_from_secs_f64(jitter_secs)
            .map_err(|_| ConfigError::InvalidJitter(jitter_secs))?;

        let config = ProbeConfig {
            concurrency,
            timeout,
            retries,
            use_head,
            jitter,
            http2,
            proxy,
            retry_http_errors: true,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the scheduler relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(0.0));
        }
        Ok(())
    }

    /// Connect timeout: half of the total per-attempt timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.timeout / 2
    }

    /// Upper bound on transport calls for a single URL.
    pub fn max_attempts(&self) -> u32 {
        let per_cycle = if self.use_head { 2 } else { 1 };
        (self.retries + 1) * per_cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_secs_accepts_fractional_values() {
        let config = ProbeConfig::from_secs(5, 1.5, 1, true, 0.25, false, None).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.jitter, Duration::from_millis(250));
        assert_eq!(config.connect_timeout(), Duration::from_millis(750));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let err = ProbeConfig::from_secs(0, 1.0, 0, true, 0.0, false, None).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroConcurrency));
    }

    #[test]
    fn test_bad_timeout_and_jitter_are_rejected() {
        assert!(matches!(
            ProbeConfig::from_secs(1, 0.0, 0, true, 0.0, false, None),
            Err(ConfigError::InvalidTimeout(_))
        ));
        assert!(matches!(
            ProbeConfig::from_secs(1, f64::NAN, 0, true, 0.0, false, None),
            Err(ConfigError::InvalidTimeout(_))
        ));
        assert!(matches!(
            ProbeConfig::from_secs(1, 1.0, 0, true, -0.5, false, None),
            Err(ConfigError::InvalidJitter(_))
        ));
    }

    #[test]
    fn test_max_attempts() {
        let mut config = ProbeConfig { retries: 2, ..ProbeConfig::default() };
        assert_eq!(config.max_attempts(), 6);
        config.use_head = false;
        assert_eq!(config.max_attempts(), 3);
    }
}
