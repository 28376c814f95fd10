//! `Handle`: owner of one native identifier.
//!
//! A handle releases its identifier exactly once: on `close()` or on drop,
//! whichever comes first. Cloning asks the library to bump the identifier's
//! reference count, so every clone also releases exactly once.
//!
//! ```ignore
//! let id = lib.api().create_file("run.h5");
//! let file = Handle::new(lib.clone(), id);   // takes over the reference
//! let alias = file.clone();                  // ref count 2
//! drop(file);                                // ref count 1
//! ```

use std::fmt;

use h5wrap_sys::{hid_t, HandleKind, H5I_INVALID_HID};

use crate::error::Result;
use crate::library::Library;

pub struct Handle {
    id: hid_t,
    lib: Option<Library>,
}

impl Handle {
    /// Take ownership of `id`. The caller's reference is transferred; it is
    /// released when the handle goes away.
    pub fn new(lib: Library, id: hid_t) -> Self {
        crate::ktrace!("handle {} adopted", id);
        Self { id, lib: Some(lib) }
    }

    /// Share `id` without consuming the caller's reference: the count is
    /// incremented first.
    #[track_caller]
    pub fn borrowed(lib: Library, id: hid_t) -> Result<Self> {
        if lib.api().inc_ref(id) < 0 {
            return lib.errors().fail(format!("failed to increment reference count of {}", id));
        }
        crate::ktrace!("handle {} borrowed", id);
        Ok(Self { id, lib: Some(lib) })
    }

    /// Raw identifier. Never releases anything.
    #[inline]
    pub fn id(&self) -> hid_t {
        self.id
    }

    pub fn library(&self) -> Option<&Library> {
        self.lib.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        match &self.lib {
            Some(lib) if self.id >= 0 => lib.api().is_valid(self.id) > 0,
            _ => false,
        }
    }

    fn bound(&self) -> Result<&Library> {
        match &self.lib {
            Some(lib) if self.id >= 0 => Ok(lib),
            _ => Err(crate::local_err!("operation on an invalid handle")),
        }
    }

    /// Category of the identifier.
    pub fn kind(&self) -> Result<HandleKind> {
        let lib = self.bound()?;
        match lib.api().identifier_kind(self.id) {
            HandleKind::BadId => lib.errors().fail(format!("could not determine the category of {}", self.id)),
            kind => Ok(kind),
        }
    }

    pub fn ref_count(&self) -> Result<i32> {
        let lib = self.bound()?;
        let count = lib.api().ref_count(self.id);
        if count < 0 {
            return lib.errors().fail(format!("could not read the reference count of {}", self.id));
        }
        Ok(count)
    }

    /// Release the identifier now. The handle is invalid afterwards, even
    /// when the release fails.
    pub fn close(&mut self) -> Result<()> {
        let id = std::mem::replace(&mut self.id, H5I_INVALID_HID);
        let Some(lib) = self.lib.take() else {
            return Ok(());
        };
        if id < 0 || lib.api().is_valid(id) <= 0 {
            return Ok(());
        }
        let kind = lib.api().identifier_kind(id);
        if lib.api().close(id) < 0 {
            return lib.errors().fail(format!("failed to close {} {}", kind.name(), id));
        }
        crate::ktrace!("{} {} closed", kind.name(), id);
        Ok(())
    }

    /// Move the identifier out, leaving `self` invalid.
    pub fn take(&mut self) -> Handle {
        Handle {
            id: std::mem::replace(&mut self.id, H5I_INVALID_HID),
            lib: self.lib.take(),
        }
    }

    /// Give up ownership without releasing.
    pub fn into_raw(mut self) -> hid_t {
        self.lib = None;
        std::mem::replace(&mut self.id, H5I_INVALID_HID)
    }

    /// Fallible clone.
    pub fn try_clone(&self) -> Result<Handle> {
        match &self.lib {
            Some(lib) if self.is_valid() => Handle::borrowed(lib.clone(), self.id),
            _ => Ok(Handle::default()),
        }
    }
}

impl Default for Handle {
    /// The invalid handle.
    fn default() -> Self {
        Self {
            id: H5I_INVALID_HID,
            lib: None,
        }
    }
}

impl Clone for Handle {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|e| {
            crate::kwarn!("clone of handle {} failed: {}", self.id, e);
            Handle::default()
        })
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            crate::kwarn!("{} (during drop)", e);
        }
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Handle {}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("backend", &self.lib.as_ref().map(Library::name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h5wrap_sys::{MemoryLibrary, NativeKind};
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryLibrary>, Library) {
        let mem = Arc::new(MemoryLibrary::with_close_tracking());
        let lib = Library::from_arc(mem.clone());
        lib.errors().set_auto_print(false).unwrap();
        (mem, lib)
    }

    fn new_file(lib: &Library, name: &str) -> Handle {
        let id = lib.api().create_file(name);
        assert!(id >= 0);
        Handle::new(lib.clone(), id)
    }

    #[test]
    fn test_default_is_invalid() {
        let h = Handle::default();
        assert!(!h.is_valid());
        assert_eq!(h.id(), H5I_INVALID_HID);
        assert!(h.kind().unwrap_err().is_local());
    }

    #[test]
    fn test_take_moves_validity() {
        let (_mem, lib) = setup();
        let mut a = new_file(&lib, "take.h5");
        let id = a.id();
        let b = a.take();
        assert!(!a.is_valid());
        assert!(b.is_valid());
        assert_eq!(b.id(), id);

        let mut invalid = Handle::default();
        assert!(!invalid.take().is_valid());
    }

    #[test]
    fn test_one_close_per_value() {
        let (mem, lib) = setup();
        let mut a = new_file(&lib, "once.h5");
        let id = a.id();
        let b = a.clone();
        assert_eq!(b.ref_count().unwrap(), 2);
        let c = a.take();
        drop(a);
        assert_eq!(mem.close_calls(id), 0);
        drop(b);
        assert_eq!(mem.close_calls(id), 1);
        drop(c);
        assert_eq!(mem.close_calls(id), 2);
        assert_eq!(mem.open_count(), 0);
    }

    #[test]
    fn test_explicit_close_then_drop() {
        let (mem, lib) = setup();
        let mut h = new_file(&lib, "close.h5");
        let id = h.id();
        h.close().unwrap();
        assert!(!h.is_valid());
        drop(h);
        assert_eq!(mem.close_calls(id), 1);
    }

    #[test]
    fn test_borrowed_keeps_callers_reference() {
        let (mem, lib) = setup();
        let id = lib.api().create_file("borrow.h5");
        {
            let h = Handle::borrowed(lib.clone(), id).unwrap();
            assert_eq!(h.ref_count().unwrap(), 2);
        }
        assert_eq!(lib.api().is_valid(id), 1);
        assert_eq!(lib.api().ref_count(id), 1);
        assert_eq!(lib.api().close(id), 0);
        assert_eq!(mem.open_count(), 0);
    }

    #[test]
    fn test_borrowed_bad_id_fails_with_stack() {
        let (_mem, lib) = setup();
        let e = Handle::borrowed(lib, 42).unwrap_err();
        assert!(e.is_native());
        assert_eq!(e.stack().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_into_raw_skips_release() {
        let (mem, lib) = setup();
        let h = new_file(&lib, "raw.h5");
        let id = h.into_raw();
        assert_eq!(mem.close_calls(id), 0);
        assert_eq!(lib.api().is_valid(id), 1);
    }

    #[test]
    fn test_kind_and_equality() {
        let (_mem, lib) = setup();
        let h = new_file(&lib, "kind.h5");
        assert_eq!(h.kind().unwrap(), HandleKind::File);
        let alias = h.clone();
        assert_eq!(h, alias);
        assert_ne!(h, Handle::default());
    }

    #[test]
    fn test_clone_of_invalid_is_invalid() {
        let h = Handle::default();
        assert!(!h.clone().is_valid());
    }

    #[test]
    fn test_failed_close_on_drop_is_suppressed() {
        let (_mem, lib) = setup();
        // Predefined types belong to the library and refuse to close.
        let predefined = lib.api().native_type(NativeKind::Int32);
        drop(Handle::new(lib.clone(), predefined));
        assert_eq!(lib.api().is_valid(predefined), 1);

        let mut second = Handle::new(lib.clone(), predefined);
        let e = second.close().unwrap_err();
        assert!(e.is_native());
        assert_eq!(e.stack().map(|s| s.len()), Some(2));
        assert!(!second.is_valid());
        assert_eq!(lib.api().is_valid(predefined), 1);
    }
}
