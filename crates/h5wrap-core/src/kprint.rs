//! Leveled diagnostics on stderr.
//!
//! Each line is written under the stderr lock so concurrent threads never
//! interleave within a line. Lines carry a level tag and the `h5wrap` origin.
//!
//! # Environment Variables
//!
//! - `H5W_LOG_LEVEL=<level>` - off, error, warn, info, debug, trace (or 0-5).
//!   Default: warn.
//! - `H5W_FLUSH_EPRINT=1` - flush stderr after every line.
//!
//! Both are read once, on first use, and can be overridden with
//! [`set_log_level`] / [`set_flush_enabled`].
//!
//! ```ignore
//! use h5wrap_core::{kdebug, kwarn};
//!
//! kdebug!("opened {} as {}", path, id);
//! kwarn!("close of {} failed during drop", id);
//! ```

use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Once;

use crate::env::{env_get_bool, env_get_opt};

pub const ENV_LOG_LEVEL: &str = "H5W_LOG_LEVEL";
pub const ENV_FLUSH_EPRINT: &str = "H5W_FLUSH_EPRINT";

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    const fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "0" => Ok(LogLevel::Off),
            "error" | "1" => Ok(LogLevel::Error),
            "warn" | "warning" | "2" => Ok(LogLevel::Warn),
            "info" | "3" => Ok(LogLevel::Info),
            "debug" | "4" => Ok(LogLevel::Debug),
            "trace" | "5" => Ok(LogLevel::Trace),
            _ => Err(()),
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn as u8);
static FLUSH: AtomicBool = AtomicBool::new(false);
static ENV_READ: Once = Once::new();

fn load_env() {
    ENV_READ.call_once(|| {
        if let Some(level) = env_get_opt::<LogLevel>(ENV_LOG_LEVEL) {
            LEVEL.store(level as u8, Ordering::Relaxed);
        }
        FLUSH.store(env_get_bool(ENV_FLUSH_EPRINT, false), Ordering::Relaxed);
    });
}

pub fn log_level() -> LogLevel {
    load_env();
    LogLevel::from_u8(LEVEL.load(Ordering::Relaxed))
}

pub fn set_log_level(level: LogLevel) {
    load_env();
    LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn flush_enabled() -> bool {
    load_env();
    FLUSH.load(Ordering::Relaxed)
}

pub fn set_flush_enabled(enabled: bool) {
    load_env();
    FLUSH.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn level_enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && level <= log_level()
}

fn emit(prefix: Option<LogLevel>, args: std::fmt::Arguments<'_>, newline: bool) {
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    if let Some(level) = prefix {
        let _ = write!(out, "[h5wrap {:>5}] ", level.tag());
    }
    let _ = out.write_fmt(args);
    if newline {
        let _ = out.write_all(b"\n");
    }
    if flush_enabled() {
        let _ = out.flush();
    }
}

#[doc(hidden)]
pub fn _kprint_impl(args: std::fmt::Arguments<'_>, newline: bool) {
    emit(None, args, newline);
}

#[doc(hidden)]
pub fn _klog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if level_enabled(level) {
        emit(Some(level), args, true);
    }
}

// ── Macros ──

/// Unleveled line on stderr.
#[macro_export]
macro_rules! kprintln {
    () => {
        $crate::kprint::_kprint_impl(format_args!(""), true)
    };
    ($($arg:tt)*) => {
        $crate::kprint::_kprint_impl(format_args!($($arg)*), true)
    };
}

#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Error, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Debug, format_args!($($arg)*))
    };
}

/// Per-call tracing (handle open/close).
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Trace, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(" TRACE ".parse::<LogLevel>(), Ok(LogLevel::Trace));
        assert_eq!("3".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_off_is_never_enabled() {
        assert!(!level_enabled(LogLevel::Off));
    }

    #[test]
    fn test_macros_expand() {
        kprintln!();
        kerror!("error {}", 1);
        kwarn!("warn");
        kinfo!("info");
        kdebug!("debug {:?}", "x");
        ktrace!("trace");
    }
}
