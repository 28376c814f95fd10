//! `ErrorContext`: per-thread coordinator for the native error stack.
//!
//! The native stack and the auto-print flag are per-thread state, so a
//! context is bound to the thread that obtained it from `Library::errors`
//! and is `!Send`.
//!
//! ```text
//! native call fails (< 0)
//!   auto_print on  → Err(Native(message))                    stack already printed
//!   auto_print off → Err(Native(message) ← StackError[..])   stack drained, cleared
//! ```

use std::marker::PhantomData;
use std::panic::Location;

use h5wrap_sys::{WalkDirection, SUCCEED};

use super::descriptor::{ErrorDescriptor, StackError};
use super::print::write_stack;
use super::{Error, ErrorKind, Result};
use crate::library::Library;

pub struct ErrorContext {
    lib: Library,
    _thread_bound: PhantomData<*const ()>,
}

impl ErrorContext {
    pub(crate) fn new(lib: Library) -> Self {
        Self {
            lib,
            _thread_bound: PhantomData,
        }
    }

    pub fn library(&self) -> &Library {
        &self.lib
    }

    /// Install (`true`) or remove the native printer for this thread.
    pub fn set_auto_print(&self, enabled: bool) -> Result<()> {
        if self.lib.api().set_auto_print(enabled) < 0 {
            return Err(Error::native(format!(
                "failed to {} automatic error printing",
                if enabled { "enable" } else { "disable" }
            )));
        }
        crate::kdebug!("auto-print {} on {}", enabled, self.lib.name());
        Ok(())
    }

    pub fn auto_print(&self) -> bool {
        self.lib.api().auto_print() > 0
    }

    /// Drain the native stack into descriptors, API function first, and
    /// clear it. Empty when auto-print is on.
    pub fn extract_stack(&self) -> StackError {
        if self.auto_print() {
            return StackError::default();
        }
        let api = self.lib.api();
        let mut frames = Vec::new();
        let ret = api.walk_error_stack(WalkDirection::Downward, &mut |_, record| {
            frames.push(ErrorDescriptor::from_record(api, record));
            SUCCEED
        });
        if ret < 0 {
            crate::kwarn!("error stack walk failed after {} frames", frames.len());
        }
        self.clear_stack();
        StackError::new(frames)
    }

    /// Drain the stack and render it, one indented frame per line.
    pub fn print_stack(&self) -> String {
        let mut out = String::new();
        write_stack(&mut out, &self.extract_stack(), 1);
        out
    }

    pub fn clear_stack(&self) {
        if self.lib.api().clear_error_stack() < 0 {
            crate::kwarn!("failed to clear the error stack on {}", self.lib.name());
        }
    }

    /// Error for a failed native call. Carries the drained stack as its
    /// source unless auto-print already consumed it.
    #[track_caller]
    pub fn error_with_stack(&self, message: impl Into<String>) -> Error {
        let loc = Location::caller();
        let error = Error::at(ErrorKind::Native, message, loc.file(), loc.line());
        if self.auto_print() {
            error
        } else {
            error.with_source(self.extract_stack())
        }
    }

    #[track_caller]
    pub fn fail<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(self.error_with_stack(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::print_nested;
    use h5wrap_sys::MemoryLibrary;
    use std::sync::{Arc, Mutex};

    /// Library whose auto-print output is captured instead of printed.
    fn captured() -> (Library, Arc<Mutex<Vec<String>>>) {
        let mem = MemoryLibrary::new();
        let printed = Arc::new(Mutex::new(Vec::new()));
        let sink = printed.clone();
        mem.set_printer(Box::new(move |s| sink.lock().unwrap().push(s.to_string())));
        (Library::new(mem), printed)
    }

    fn provoke(lib: &Library) {
        assert!(lib.api().close(987_654) < 0);
    }

    #[test]
    fn test_auto_print_round_trip() {
        let lib = Library::memory();
        let errors = lib.errors();
        assert!(errors.auto_print());
        errors.set_auto_print(false).unwrap();
        assert!(!errors.auto_print());
        errors.set_auto_print(true).unwrap();
        assert!(errors.auto_print());
    }

    #[test]
    fn test_extract_matches_native_depth() {
        let lib = Library::memory();
        let errors = lib.errors();
        errors.set_auto_print(false).unwrap();
        provoke(&lib);

        let depth = lib.api().error_count() as usize;
        assert!(depth > 0);
        let stack = errors.extract_stack();
        assert_eq!(stack.len(), depth);
        assert_eq!(stack.descriptors()[0].function(), "H5Idec_ref");
        assert!(errors.extract_stack().is_empty());
    }

    #[test]
    fn test_extract_empty_with_auto_print() {
        let (lib, printed) = captured();
        let errors = lib.errors();
        provoke(&lib);
        assert!(errors.extract_stack().is_empty());
        assert_eq!(printed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_error_with_stack_nests_descriptors() {
        let lib = Library::memory();
        let errors = lib.errors();
        errors.set_auto_print(false).unwrap();
        provoke(&lib);
        let depth = lib.api().error_count() as usize;

        let e = errors.error_with_stack("msg");
        assert_eq!(e.message(), "msg");
        assert!(e.is_native());
        assert_eq!(e.stack().map(StackError::len), Some(depth));
        assert_eq!(lib.api().error_count(), 0);
    }

    #[test]
    fn test_error_with_stack_plain_under_auto_print() {
        let (lib, _printed) = captured();
        provoke(&lib);
        let e = lib.errors().error_with_stack("msg");
        assert_eq!(e.message(), "msg");
        assert!(e.stack().is_none());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn test_fail_records_call_site() {
        let lib = Library::memory();
        let r: Result<()> = lib.errors().fail("nope");
        let e = r.unwrap_err();
        assert!(e.location().0.ends_with("context.rs"));
    }

    #[test]
    fn test_print_nested_three_lines() {
        let lib = Library::memory();
        let errors = lib.errors();
        errors.set_auto_print(false).unwrap();
        provoke(&lib);
        let e = errors.error_with_stack("A");
        let stack = e.stack().unwrap().clone();
        assert_eq!(stack.len(), 2);

        let text = print_nested(&e, 0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "A");
        assert_eq!(lines[1], format!("  {}", stack.descriptors()[0]));
        assert_eq!(lines[2], format!("  {}", stack.descriptors()[1]));
    }

    #[test]
    fn test_print_stack_indents_frames() {
        let lib = Library::memory();
        let errors = lib.errors();
        errors.set_auto_print(false).unwrap();
        provoke(&lib);
        let text = errors.print_stack();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.starts_with("  ")));
        assert!(errors.print_stack().is_empty());
    }

    #[test]
    fn test_contexts_are_per_thread() {
        let lib = Library::memory();
        lib.errors().set_auto_print(false).unwrap();
        let other = lib.clone();
        let auto = std::thread::spawn(move || other.errors().auto_print()).join().unwrap();
        assert!(auto);
        assert!(!lib.errors().auto_print());
    }

    #[test]
    fn test_failed_walk_keeps_partial_stack() {
        let mem = Arc::new(MemoryLibrary::new());
        let lib = Library::from_arc(mem.clone());
        let errors = lib.errors();
        errors.set_auto_print(false).unwrap();
        provoke(&lib);
        assert_eq!(lib.api().error_count(), 2);

        mem.abort_walks_after(Some(1));
        let stack = errors.extract_stack();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.descriptors()[0].function(), "H5Idec_ref");
        assert_eq!(lib.api().error_count(), 0);
    }
}
