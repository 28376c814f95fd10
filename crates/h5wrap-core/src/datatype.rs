//! `Datatype`: element type of a dataset.
//!
//! Rust primitives map to the library's predefined native types through
//! `NativeType`:
//!
//! | Rust  | `NativeKind` |
//! |-------|--------------|
//! | `i8`  | `Int8`       |
//! | `u8`  | `UInt8`      |
//! | `i16` | `Int16`      |
//! | `u16` | `UInt16`     |
//! | `i32` | `Int32`      |
//! | `u32` | `UInt32`     |
//! | `i64` | `Int64`      |
//! | `u64` | `UInt64`     |
//! | `f32` | `Float32`    |
//! | `f64` | `Float64`    |

use h5wrap_sys::{HandleKind, NativeKind};

use crate::error::Result;
use crate::handle::Handle;
use crate::library::Library;

/// A Rust type with a predefined native counterpart.
pub trait NativeType {
    const KIND: NativeKind;
}

impl NativeType for i8 {
    const KIND: NativeKind = NativeKind::Int8;
}

impl NativeType for u8 {
    const KIND: NativeKind = NativeKind::UInt8;
}

impl NativeType for i16 {
    const KIND: NativeKind = NativeKind::Int16;
}

impl NativeType for u16 {
    const KIND: NativeKind = NativeKind::UInt16;
}

impl NativeType for i32 {
    const KIND: NativeKind = NativeKind::Int32;
}

impl NativeType for u32 {
    const KIND: NativeKind = NativeKind::UInt32;
}

impl NativeType for i64 {
    const KIND: NativeKind = NativeKind::Int64;
}

impl NativeType for u64 {
    const KIND: NativeKind = NativeKind::UInt64;
}

impl NativeType for f32 {
    const KIND: NativeKind = NativeKind::Float32;
}

impl NativeType for f64 {
    const KIND: NativeKind = NativeKind::Float64;
}

#[derive(Debug, Clone)]
pub struct Datatype {
    handle: Handle,
}

impl Datatype {
    /// Owned copy of the native type for `T`.
    pub fn native<T: NativeType>(lib: &Library) -> Result<Self> {
        Self::from_kind(lib, T::KIND)
    }

    /// The predefined ids belong to the library and must never be closed,
    /// so the wrapper always owns a copy.
    pub fn from_kind(lib: &Library, kind: NativeKind) -> Result<Self> {
        let predefined = lib.api().native_type(kind);
        if predefined < 0 {
            return lib.errors().fail(format!("no native type for {:?}", kind));
        }
        let id = lib.api().copy_type(predefined);
        if id < 0 {
            return lib.errors().fail(format!("failed to copy native type {:?}", kind));
        }
        Ok(Self { handle: Handle::new(lib.clone(), id) })
    }

    pub fn from_handle(handle: Handle) -> Result<Self> {
        crate::ensure_local!(
            handle.kind()? == HandleKind::Datatype,
            "handle {} is not a datatype",
            handle.id()
        );
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn library(&self) -> Result<&Library> {
        self.handle
            .library()
            .ok_or_else(|| crate::local_err!("datatype handle is closed"))
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> Result<usize> {
        let lib = self.library()?;
        match lib.api().type_size(self.handle.id()) {
            0 => lib.errors().fail("failed to retrieve datatype size"),
            n => Ok(n),
        }
    }

    pub fn equals(&self, other: &Datatype) -> Result<bool> {
        let lib = self.library()?;
        match lib.api().types_equal(self.handle.id(), other.handle.id()) {
            r if r < 0 => lib.errors().fail("failed to compare datatypes"),
            r => Ok(r > 0),
        }
    }
}
