use h5wrap_sys::HandleKind;

use super::{Group, Node, Path};
use crate::error::Result;
use crate::handle::Handle;
use crate::library::Library;

/// An open file.
#[derive(Debug, Clone)]
pub struct File {
    handle: Handle,
    lib: Library,
    name: String,
}

impl File {
    /// Create `name`, truncating an existing file.
    pub fn create(lib: &Library, name: &str) -> Result<File> {
        let id = lib.api().create_file(name);
        if id < 0 {
            return lib.errors().fail(format!("failed to create file {}", name));
        }
        crate::kdebug!("created file {} as {}", name, id);
        Ok(Self::adopt(lib, id, name))
    }

    /// Open an existing file read-only.
    pub fn open(lib: &Library, name: &str) -> Result<File> {
        Self::open_with(lib, name, false)
    }

    pub fn open_writable(lib: &Library, name: &str) -> Result<File> {
        Self::open_with(lib, name, true)
    }

    fn open_with(lib: &Library, name: &str, writable: bool) -> Result<File> {
        let id = lib.api().open_file(name, writable);
        if id < 0 {
            return lib.errors().fail(format!("failed to open file {}", name));
        }
        crate::kdebug!("opened file {} as {}", name, id);
        Ok(Self::adopt(lib, id, name))
    }

    fn adopt(lib: &Library, id: h5wrap_sys::hid_t, name: &str) -> Self {
        Self {
            handle: Handle::new(lib.clone(), id),
            lib: lib.clone(),
            name: name.to_string(),
        }
    }

    /// Take over an already open file identifier.
    pub fn from_handle(handle: Handle, name: &str) -> Result<File> {
        crate::ensure_local!(
            handle.kind()? == HandleKind::File,
            "handle {} for {} is not a file",
            handle.id(),
            name
        );
        let lib = match handle.library() {
            Some(lib) => lib.clone(),
            None => return Err(crate::local_err!("handle for {} is not bound to a library", name)),
        };
        Ok(Self {
            handle,
            lib,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn library(&self) -> &Library {
        &self.lib
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// The root group `/`.
    pub fn root(&self) -> Result<Group> {
        crate::ensure_local!(self.is_valid(), "file {} is closed", self.name);
        let id = self.lib.api().open_object(self.handle.id(), "/");
        if id < 0 {
            return self
                .lib
                .errors()
                .fail(format!("failed to open the root group of {}", self.name));
        }
        Group::try_from(Node::new(Handle::new(self.lib.clone(), id), Path::root()))
    }

    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h5wrap_sys::{MemoryLibrary, NodeType};
    use std::sync::Arc;

    #[test]
    fn test_create_open_root() {
        let lib = Library::memory();
        let file = File::create(&lib, "f.h5").unwrap();
        assert!(file.is_valid());
        assert_eq!(file.name(), "f.h5");
        let root = file.root().unwrap();
        assert!(root.path().is_root());

        let again = File::open(&lib, "f.h5").unwrap();
        assert_ne!(again.handle(), file.handle());
    }

    #[test]
    fn test_open_missing_fails_with_stack() {
        let lib = Library::memory();
        lib.errors().set_auto_print(false).unwrap();
        let e = File::open(&lib, "missing.h5").unwrap_err();
        assert_eq!(e.message(), "failed to open file missing.h5");
        assert!(e.stack().is_some_and(|s| !s.is_empty()));
    }

    #[test]
    fn test_drop_releases_everything() {
        let mem = Arc::new(MemoryLibrary::new());
        let lib = Library::from_arc(mem.clone());
        {
            let file = File::create(&lib, "drop.h5").unwrap();
            let _root = file.root().unwrap();
            assert_eq!(mem.open_count(), 2);
        }
        assert_eq!(mem.open_count(), 0);
    }

    #[test]
    fn test_closed_file_has_no_root() {
        let lib = Library::memory();
        let mut file = File::create(&lib, "closed.h5").unwrap();
        file.close().unwrap();
        assert!(file.root().unwrap_err().is_local());
    }

    #[test]
    fn test_from_handle_checks_kind() {
        let lib = Library::memory();
        let space = Handle::new(lib.clone(), lib.api().create_scalar_space());
        assert!(File::from_handle(space, "x").unwrap_err().is_local());

        let id = lib.api().create_file("h.h5");
        let file = File::from_handle(Handle::new(lib.clone(), id), "h.h5").unwrap();
        assert!(file.root().is_ok());
    }

    #[test]
    fn test_create_refused_while_open() {
        let lib = Library::memory();
        lib.errors().set_auto_print(false).unwrap();
        let file = File::create(&lib, "busy.h5").unwrap();
        let root = file.root().unwrap();
        Group::create(&root, "g").unwrap();
        let g = root.open("g").unwrap();

        let e = File::create(&lib, "busy.h5").unwrap_err();
        assert!(e.is_native());
        assert_eq!(e.message(), "failed to create file busy.h5");
        assert_eq!(g.node_type().unwrap(), NodeType::Group);
    }

    #[test]
    fn test_read_only_open_refuses_writes() {
        let lib = Library::memory();
        lib.errors().set_auto_print(false).unwrap();
        let file = File::create(&lib, "ro.h5").unwrap();

        let ro = File::open(&lib, "ro.h5").unwrap();
        let e = Group::create(&ro.root().unwrap(), "g").unwrap_err();
        assert!(e.is_native());
        assert!(e.stack().is_some_and(|s| s.len() == 2));

        let rw = File::open_writable(&lib, "ro.h5").unwrap();
        Group::create(&rw.root().unwrap(), "g").unwrap();
        assert!(file.root().unwrap().exists("g").unwrap());
    }
}
