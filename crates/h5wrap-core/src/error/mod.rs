//! Error types.
//!
//! Two kinds of failure reach callers:
//!
//! | Kind              | Raised by                                  | Source chain            |
//! |-------------------|--------------------------------------------|-------------------------|
//! | `ErrorKind::Local`  | wrapper-side checks (`local_err!`)        | optional, any error     |
//! | `ErrorKind::Native` | `ErrorContext` after a failed native call | `StackError` when quiet |
//!
//! A `StackError` is the drained native error stack: one `ErrorDescriptor`
//! per frame, API function first. `print_nested` renders any chain built
//! from these.

mod context;
mod descriptor;
#[macro_use]
mod macros;
mod print;

use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;

pub use context::ErrorContext;
pub use descriptor::{Category, ErrorDescriptor, StackError};
pub use print::{print_nested, INDENT};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Detected by the wrapper without calling into the library.
    Local,
    /// A native call reported failure.
    Native,
}

pub struct Error {
    kind: ErrorKind,
    message: String,
    file: &'static str,
    line: u32,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    /// Build an error at an explicit location. The macros pass `file!()` /
    /// `line!()` here.
    pub fn at(kind: ErrorKind, message: impl Into<String>, file: &'static str, line: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            file,
            line,
            source: None,
        }
    }

    #[track_caller]
    pub fn local(message: impl Into<String>) -> Self {
        let loc = Location::caller();
        Self::at(ErrorKind::Local, message, loc.file(), loc.line())
    }

    #[track_caller]
    pub fn native(message: impl Into<String>) -> Self {
        let loc = Location::caller();
        Self::at(ErrorKind::Native, message, loc.file(), loc.line())
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the error was raised.
    pub fn location(&self) -> (&'static str, u32) {
        (self.file, self.line)
    }

    pub fn is_local(&self) -> bool {
        self.kind == ErrorKind::Local
    }

    pub fn is_native(&self) -> bool {
        self.kind == ErrorKind::Native
    }

    /// The native stack attached to this error, if it carries one.
    pub fn stack(&self) -> Option<&StackError> {
        self.source.as_deref().and_then(|s| s.downcast_ref::<StackError>())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|s| s as &(dyn StdError + 'static))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Error");
        d.field("kind", &self.kind);
        d.field("message", &self.message);
        d.field("location", &format_args!("{}:{}", self.file, self.line));
        if let Some(src) = &self.source {
            d.field("source", src);
        }
        d.finish()
    }
}

// ── ResultExt ──

/// Wrap a failure as the source of a new local error, adding one nesting
/// level to the chain `print_nested` shows.
///
/// ```ignore
/// use h5wrap_core::error::ResultExt;
///
/// dataset.resize(&[20]).context("growing the event buffer")?;
/// ```
pub trait ResultExt<T> {
    #[track_caller]
    fn context(self, message: &str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    #[track_caller]
    fn context(self, message: &str) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::local(message).with_source(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message_only() {
        let e = Error::native("cannot open").with_source(std::io::Error::other("inner"));
        assert_eq!(e.to_string(), "cannot open");
        assert!(e.source().is_some());
        assert!(e.is_native());
    }

    #[test]
    fn test_location_is_caller() {
        let e = Error::local("x");
        let (file, line) = e.location();
        assert!(file.ends_with("mod.rs"));
        assert!(line > 0);
        assert!(e.is_local());
    }

    #[test]
    fn test_stack_downcast() {
        let plain = Error::native("a");
        assert!(plain.stack().is_none());

        let nested = Error::native("b").with_source(StackError::default());
        assert_eq!(nested.stack().map(StackError::len), Some(0));
    }

    #[test]
    fn test_context_wraps() {
        let r: std::result::Result<(), Error> = Err(Error::native("inner"));
        let e = r.context("outer").unwrap_err();
        assert_eq!(e.message(), "outer");
        assert!(e.is_local());
        assert_eq!(e.source().map(|s| s.to_string()).as_deref(), Some("inner"));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
