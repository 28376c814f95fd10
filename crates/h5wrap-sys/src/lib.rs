//! # h5wrap-sys
//!
//! Native boundary for h5wrap.
//!
//! ## Modules
//!
//! - `types` - raw identifier and status types, category enums
//! - `api` - the `NativeApi` trait the wrapper layer calls
//! - `memory` - `MemoryLibrary`, the in-process implementation
//! - `linked` - `LinkedLibrary`, bindings to the system libhdf5 (feature `hdf5`)
//!
//! `DefaultLibrary` names the backend selected at build time.

pub mod types;
pub mod api;
pub mod memory;

#[cfg(feature = "hdf5")]
pub mod linked;

pub use api::{ErrorVisitor, NativeApi};
pub use memory::MemoryLibrary;
pub use types::*;

#[cfg(feature = "hdf5")]
pub use linked::LinkedLibrary;

cfg_if::cfg_if! {
    if #[cfg(feature = "hdf5")] {
        pub type DefaultLibrary = LinkedLibrary;

        /// Instantiate the build-time default backend.
        pub fn default_library() -> Option<DefaultLibrary> {
            LinkedLibrary::new()
        }
    } else {
        pub type DefaultLibrary = MemoryLibrary;

        /// Instantiate the build-time default backend.
        pub fn default_library() -> Option<DefaultLibrary> {
            Some(MemoryLibrary::new())
        }
    }
}
