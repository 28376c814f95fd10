use std::error::Error as StdError;
use std::fmt;

use h5wrap_sys::{hid_t, ErrorRecord, NativeApi};

/// Major or minor classification of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    pub code: hid_t,
    pub message: String,
}

impl Category {
    fn resolve(api: &dyn NativeApi, code: hid_t) -> Self {
        Self {
            code,
            message: api.error_message(code).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "#{}", self.code)
        } else {
            f.write_str(&self.message)
        }
    }
}

/// One frame of the native error stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    class_name: String,
    major: Category,
    minor: Category,
    description: String,
    function: String,
    file: String,
    line: u32,
}

impl ErrorDescriptor {
    /// Copy a raw frame, resolving class and message names through `api`.
    pub(crate) fn from_record(api: &dyn NativeApi, record: &ErrorRecord) -> Self {
        Self {
            class_name: api.error_class_name(record.class_id).unwrap_or_default(),
            major: Category::resolve(api, record.major),
            minor: Category::resolve(api, record.minor),
            description: record.description.clone(),
            function: record.function.clone(),
            file: record.file.clone(),
            line: record.line,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn major(&self) -> &Category {
        &self.major
    }

    pub fn minor(&self) -> &Category {
        &self.minor
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}() {}:{}: {} ({}: {} / {})",
            self.function, self.file, self.line, self.description, self.class_name, self.major, self.minor
        )
    }
}

impl StdError for ErrorDescriptor {}

/// The drained native error stack, API function first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackError {
    descriptors: Vec<ErrorDescriptor>,
}

impl StackError {
    pub fn new(descriptors: Vec<ErrorDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn descriptors(&self) -> &[ErrorDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorDescriptor> {
        self.descriptors.iter()
    }

    pub fn into_descriptors(self) -> Vec<ErrorDescriptor> {
        self.descriptors
    }
}

impl<'a> IntoIterator for &'a StackError {
    type Item = &'a ErrorDescriptor;
    type IntoIter = std::slice::Iter<'a, ErrorDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native error stack ({} frames)", self.descriptors.len())
    }
}

impl StdError for StackError {}
