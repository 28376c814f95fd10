//! Per-thread error stacks for `MemoryLibrary`.
//!
//! Frames are stored in push order: the innermost failure first, the API
//! function that reported it last. Each thread owns its own stack and its
//! own auto-print flag per library instance, held in thread-local storage
//! so the state goes away with the thread. Entries back at the default
//! state (auto-print on, no frames) are pruned.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use super::codes;
use crate::types::{hid_t, ErrorRecord};

/// Sink used by the auto-print mode.
pub type Printer = Box<dyn Fn(&str) + Send + Sync>;

/// One frame about to be pushed.
#[derive(Debug)]
pub(crate) struct Failure {
    pub function: &'static str,
    pub major: hid_t,
    pub minor: hid_t,
    pub description: String,
    pub file: &'static str,
    pub line: u32,
}

impl Failure {
    #[track_caller]
    pub fn new(
        function: &'static str,
        major: hid_t,
        minor: hid_t,
        description: impl Into<String>,
    ) -> Self {
        let loc = Location::caller();
        Self {
            function,
            major,
            minor,
            description: description.into(),
            file: loc.file(),
            line: loc.line(),
        }
    }

    pub fn into_record(self) -> ErrorRecord {
        ErrorRecord {
            class_id: codes::ERR_CLASS,
            major: self.major,
            minor: self.minor,
            line: self.line,
            function: self.function.to_string(),
            file: self.file.to_string(),
            description: self.description,
        }
    }
}

struct ThreadErrors {
    auto_print: bool,
    frames: Vec<ErrorRecord>,
}

impl Default for ThreadErrors {
    fn default() -> Self {
        Self {
            auto_print: true,
            frames: Vec::new(),
        }
    }
}

impl ThreadErrors {
    fn is_default(&self) -> bool {
        self.auto_print && self.frames.is_empty()
    }
}

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Calling thread's error state, keyed by `ErrorStacks` instance.
    static THREAD_ERRORS: RefCell<HashMap<u64, ThreadErrors>> = RefCell::new(HashMap::new());
}

pub(crate) struct ErrorStacks {
    owner: u64,
    printer: Mutex<Option<Printer>>,
}

impl ErrorStacks {
    pub fn new() -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            printer: Mutex::new(None),
        }
    }

    fn with_current<R>(&self, f: impl FnOnce(&mut ThreadErrors) -> R) -> R {
        THREAD_ERRORS.with(|threads| {
            let mut threads = threads.borrow_mut();
            let state = threads.entry(self.owner).or_default();
            let out = f(state);
            if state.is_default() {
                threads.remove(&self.owner);
            }
            out
        })
    }

    /// True when the calling thread holds non-default state for this instance.
    #[cfg(test)]
    fn has_state(&self) -> bool {
        THREAD_ERRORS.with(|threads| threads.borrow().contains_key(&self.owner))
    }

    pub fn clear(&self) {
        self.with_current(|t| t.frames.clear());
    }

    pub fn push(&self, record: ErrorRecord) {
        self.with_current(|t| t.frames.push(record));
    }

    pub fn len(&self) -> usize {
        self.with_current(|t| t.frames.len())
    }

    pub fn snapshot(&self) -> Vec<ErrorRecord> {
        self.with_current(|t| t.frames.clone())
    }

    pub fn set_auto_print(&self, enabled: bool) {
        self.with_current(|t| t.auto_print = enabled);
    }

    pub fn auto_print(&self) -> bool {
        self.with_current(|t| t.auto_print)
    }

    pub fn set_printer(&self, printer: Option<Printer>) {
        *self.printer.lock().unwrap_or_else(PoisonError::into_inner) = printer;
    }

    /// Called when an API function is about to return failure. In auto-print
    /// mode the stack is printed and consumed.
    pub fn report(&self, backend: &str) {
        let drained = self.with_current(|t| {
            if t.auto_print {
                Some(std::mem::take(&mut t.frames))
            } else {
                None
            }
        });
        let Some(frames) = drained else {
            return;
        };
        let text = format_stack(backend, &frames);
        let printer = self.printer.lock().unwrap_or_else(PoisonError::into_inner);
        match printer.as_ref() {
            Some(p) => p(&text),
            None => eprint!("{}", text),
        }
    }
}

impl Drop for ErrorStacks {
    fn drop(&mut self) {
        let _ = THREAD_ERRORS.try_with(|threads| threads.borrow_mut().remove(&self.owner));
    }
}

/// Render frames the way the native printer does: API function first.
pub(crate) fn format_stack(backend: &str, frames: &[ErrorRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}-DIAG: Error detected in {} ({}) thread {:?}:",
        codes::ERR_CLASS_NAME,
        codes::ERR_CLASS_NAME,
        backend,
        thread::current().id()
    );
    for (n, frame) in frames.iter().rev().enumerate() {
        let _ = writeln!(
            out,
            "  #{:03}: {} line {} in {}(): {}",
            n, frame.file, frame.line, frame.function, frame.description
        );
        let _ = writeln!(out, "    major: {}", codes::message(frame.major).unwrap_or("?"));
        let _ = writeln!(out, "    minor: {}", codes::message(frame.minor).unwrap_or("?"));
    }
    out
}
