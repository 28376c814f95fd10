//! Runtime configuration.
//!
//! ```ignore
//! let cfg = WrapConfig::from_env().auto_print(false);
//! cfg.apply(&lib)?;
//! ```

use crate::env::{env_get_bool, env_get_opt};
use crate::error::Result;
use crate::kprint::{self, LogLevel, ENV_FLUSH_EPRINT, ENV_LOG_LEVEL};
use crate::library::Library;

/// `H5W_AUTO_PRINT=0` starts threads with structured errors instead of
/// native stack printing.
pub const ENV_AUTO_PRINT: &str = "H5W_AUTO_PRINT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapConfig {
    /// Let the native library print its error stack on failure. When off,
    /// errors carry the drained stack instead.
    pub auto_print: bool,

    pub log_level: LogLevel,

    /// Flush stderr after every diagnostic line.
    pub flush_diagnostics: bool,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            auto_print: true,
            log_level: LogLevel::Warn,
            flush_diagnostics: false,
        }
    }
}

impl WrapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `H5W_AUTO_PRINT`, `H5W_LOG_LEVEL` and
    /// `H5W_FLUSH_EPRINT`.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            auto_print: env_get_bool(ENV_AUTO_PRINT, base.auto_print),
            log_level: env_get_opt(ENV_LOG_LEVEL).unwrap_or(base.log_level),
            flush_diagnostics: env_get_bool(ENV_FLUSH_EPRINT, base.flush_diagnostics),
        }
    }

    pub fn auto_print(mut self, enabled: bool) -> Self {
        self.auto_print = enabled;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn flush_diagnostics(mut self, enabled: bool) -> Self {
        self.flush_diagnostics = enabled;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.flush_diagnostics && self.log_level == LogLevel::Off {
            return Err("flush_diagnostics requires a log level other than off");
        }
        Ok(())
    }

    /// Install the logging settings process-wide and the auto-print mode
    /// for the calling thread.
    pub fn apply(&self, lib: &Library) -> Result<()> {
        if let Err(reason) = self.validate() {
            return Err(crate::local_err!("invalid configuration: {}", reason));
        }
        kprint::set_log_level(self.log_level);
        kprint::set_flush_enabled(self.flush_diagnostics);
        lib.errors().set_auto_print(self.auto_print)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = WrapConfig::new();
        assert!(cfg.auto_print);
        assert_eq!(cfg.log_level, LogLevel::Warn);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let cfg = WrapConfig::new()
            .auto_print(false)
            .log_level(LogLevel::Debug)
            .flush_diagnostics(true);
        assert!(!cfg.auto_print);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert!(cfg.flush_diagnostics);
    }

    #[test]
    fn test_flush_without_logging_rejected() {
        let cfg = WrapConfig::new().log_level(LogLevel::Off).flush_diagnostics(true);
        assert!(cfg.validate().is_err());
        let e = cfg.apply(&Library::memory()).unwrap_err();
        assert!(e.is_local());
    }

    #[test]
    fn test_apply_sets_auto_print() {
        let lib = Library::memory();
        WrapConfig::new().auto_print(false).apply(&lib).unwrap();
        assert!(!lib.errors().auto_print());
    }
}
