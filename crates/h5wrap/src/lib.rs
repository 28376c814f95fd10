//! # h5wrap
//!
//! Value-semantics handles and structured errors over the HDF5 C API.
//!
//! ## Quick Start
//!
//! ```ignore
//! use h5wrap::prelude::*;
//!
//! let lib = Library::open_default()?;
//! lib.errors().set_auto_print(false)?;
//!
//! let file = File::create(&lib, "run.h5")?;
//! let root = file.root()?;
//! let space = Dataspace::simple(&lib, &[10], Some(&[Dataspace::UNLIMITED]))?;
//! let ds = Dataset::create(&root, "events", &Datatype::native::<f64>(&lib)?, &space, Some(&[64]))?;
//!
//! if let Err(e) = ds.extent(0, -20) {
//!     eprint!("{}", print_nested(&e, 0));
//! }
//! ```
//!
//! ## Backends
//!
//! | Feature  | Default backend                      |
//! |----------|--------------------------------------|
//! | (none)   | `MemoryLibrary`, in process          |
//! | `hdf5`   | `LinkedLibrary`, system libhdf5 1.12 |
//!
//! ## Environment Variables
//!
//! - `H5W_AUTO_PRINT` - initial auto-print mode applied by `WrapConfig::from_env`
//! - `H5W_LOG_LEVEL` - diagnostic level (off, error, warn, info, debug, trace)
//! - `H5W_FLUSH_EPRINT=1` - flush stderr after every diagnostic line

pub use h5wrap_core::*;

// Logging
pub use h5wrap_core::{kdebug, kerror, kinfo, kprintln, ktrace, kwarn};
pub use h5wrap_core::kprint::{set_flush_enabled, set_log_level, LogLevel};

// Environment
pub use h5wrap_core::env::{env_get, env_get_bool, env_get_opt, env_get_str, env_is_set};

// Error construction
pub use h5wrap_core::{ensure_local, local_err};

// Backends
pub use h5wrap_sys::{MemoryLibrary, NativeApi};
#[cfg(feature = "hdf5")]
pub use h5wrap_sys::LinkedLibrary;

pub mod prelude {
    pub use h5wrap_core::{
        print_nested, resize_by, Dataset, Dataspace, Datatype, Error, ErrorKind, File, Group, Handle, Library,
        NativeType, Node, Path, Result, ResultExt, WrapConfig,
    };
}
