//! # h5wrap-core
//!
//! Resource lifetime and error translation over the HDF5 C API.
//!
//! ## Modules
//!
//! - `library` - `Library`, a shared reference to the native backend
//! - `handle` - `Handle`, RAII owner of one native identifier
//! - `error` - `Error`, `ErrorContext`, `ErrorDescriptor`, `print_nested`
//! - `node` - `Node`, `Path`, `File`, `Group`, `Dataset`
//! - `dataspace` - `Dataspace`
//! - `datatype` - `Datatype`, `NativeType`
//! - `config` - `WrapConfig`
//! - `kprint` - leveled stderr diagnostics
//! - `env` - environment variable helpers
//!
//! ## Error flow
//!
//! A failed native call is turned into an `Error` by the thread's
//! `ErrorContext`. With auto-print on (the library default) the native
//! printer has already reported and consumed the stack, and the error
//! carries only a message. With auto-print off the stack is drained into
//! `ErrorDescriptor`s and attached as the error's source.

pub mod kprint;
pub mod env;
pub mod error;
pub mod library;
pub mod handle;
pub mod dataspace;
pub mod datatype;
pub mod node;
pub mod config;

pub use config::WrapConfig;
pub use dataspace::Dataspace;
pub use datatype::{Datatype, NativeType};
pub use error::{print_nested, Error, ErrorContext, ErrorDescriptor, ErrorKind, Result, ResultExt, StackError};
pub use handle::Handle;
pub use library::Library;
pub use node::{resize_by, Dataset, File, Group, Node, ObjectId, Path};

pub use h5wrap_sys as sys;
pub use h5wrap_sys::{hid_t, hsize_t, HandleKind, NodeType, SpaceClass};
