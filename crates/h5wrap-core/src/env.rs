//! Environment variable lookup with typed defaults.
//!
//! A variable that is set but empty (or only whitespace) counts as unset.
//!
//! ```ignore
//! use h5wrap_core::env::{env_get, env_get_bool};
//!
//! let level: u8 = env_get("H5W_LOG_LEVEL", 2);
//! let quiet = !env_get_bool("H5W_AUTO_PRINT", true);
//! ```

use std::str::FromStr;

fn lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse `key` as `T`; `default` when unset or unparsable.
#[inline]
pub fn env_get<T: FromStr>(key: &str, default: T) -> T {
    env_get_opt(key).unwrap_or(default)
}

/// Parse `key` as `T`; `None` when unset or unparsable.
#[inline]
pub fn env_get_opt<T: FromStr>(key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// Boolean flag. `1/true/yes/on` and `0/false/no/off` (any case) are
/// recognised; anything else yields `default`.
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

#[inline]
pub fn env_get_str(key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

#[inline]
pub fn env_is_set(key: &str) -> bool {
    lookup(key).is_some()
}
