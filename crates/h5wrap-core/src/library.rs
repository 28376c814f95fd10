//! `Library`: shared reference to a native backend.
//!
//! Every handle, node and error context carries one. Cloning is cheap (an
//! `Arc` bump); all clones talk to the same backend.

use std::fmt;
use std::sync::Arc;

use h5wrap_sys::{MemoryLibrary, NativeApi};

use crate::error::{ErrorContext, Result};

#[derive(Clone)]
pub struct Library {
    api: Arc<dyn NativeApi>,
}

impl Library {
    pub fn new<A: NativeApi + 'static>(api: A) -> Self {
        Self { api: Arc::new(api) }
    }

    /// Share an existing backend, e.g. an `Arc<MemoryLibrary>` a test keeps
    /// for inspection.
    pub fn from_arc(api: Arc<dyn NativeApi>) -> Self {
        Self { api }
    }

    /// Fresh in-memory backend.
    pub fn memory() -> Self {
        Self::new(MemoryLibrary::new())
    }

    /// The system libhdf5.
    #[cfg(feature = "hdf5")]
    pub fn linked() -> Result<Self> {
        h5wrap_sys::LinkedLibrary::new()
            .map(Self::new)
            .ok_or_else(|| crate::error::Error::native("failed to initialise libhdf5"))
    }

    /// The backend selected at build time.
    pub fn open_default() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "hdf5")] {
                Self::linked()
            } else {
                Ok(Self::memory())
            }
        }
    }

    pub fn api(&self) -> &dyn NativeApi {
        &*self.api
    }

    pub fn name(&self) -> &str {
        self.api.name()
    }

    /// Error context for the calling thread.
    pub fn errors(&self) -> ErrorContext {
        ErrorContext::new(self.clone())
    }

    /// True when both values refer to the same backend instance.
    pub fn same_as(&self, other: &Library) -> bool {
        Arc::ptr_eq(&self.api, &other.api)
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library").field("backend", &self.api.name()).finish()
    }
}
