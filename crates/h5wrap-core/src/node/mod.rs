//! Nodes: objects inside a file, addressed by path.
//!
//! ## Modules
//!
//! - `path` - `Path`, slash-separated object paths
//! - `object_id` - `ObjectId`, (file number, token) identity
//! - `file` - `File`, the container and entry point to its root group
//! - `group` - `Group`
//! - `dataset` - `Dataset` and `resize_by`
//!
//! A `Node` is a `Handle` plus the path it was opened under. Typed wrappers
//! are built from a `Node` with `TryFrom`, which checks the object category.

mod dataset;
mod file;
mod group;
mod object_id;
mod path;

use h5wrap_sys::{NodeType, ObjectInfo};

use crate::error::Result;
use crate::handle::Handle;
use crate::library::Library;

pub use dataset::{resize_by, Dataset};
pub use file::File;
pub use group::Group;
pub use object_id::ObjectId;
pub use path::Path;

#[derive(Debug, Clone, Default)]
pub struct Node {
    handle: Handle,
    path: Path,
}

impl Node {
    pub fn new(handle: Handle, path: Path) -> Self {
        Self { handle, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn into_handle(self) -> Handle {
        self.handle
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// Backend of a node that still owns an identifier.
    pub fn library(&self) -> Result<&Library> {
        match self.handle.library() {
            Some(lib) if self.handle.id() >= 0 => Ok(lib),
            _ => Err(crate::local_err!("node {} has no open handle", self.path)),
        }
    }

    fn info(&self) -> Result<ObjectInfo> {
        let lib = self.library()?;
        let mut info = ObjectInfo::default();
        if lib.api().object_info(self.handle.id(), &mut info) < 0 {
            return lib
                .errors()
                .fail(format!("error retrieving type information for node {}", self.path));
        }
        Ok(info)
    }

    pub fn node_type(&self) -> Result<NodeType> {
        Ok(self.info()?.node_type)
    }

    pub fn id(&self) -> Result<ObjectId> {
        Ok(ObjectId::from(&self.info()?))
    }
}

/// Typed-wrapper check: `node` must be of category `expected`.
pub(crate) fn ensure_type(node: &Node, expected: NodeType) -> Result<()> {
    let actual = node.node_type()?;
    crate::ensure_local!(
        actual == expected,
        "object at {} is a {}, not a {}",
        node.path(),
        actual,
        expected
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_file(name: &str) -> File {
        let lib = Library::memory();
        lib.errors().set_auto_print(false).unwrap();
        File::create(&lib, name).unwrap()
    }

    #[test]
    fn test_node_type_and_path() {
        let file = quiet_file("node.h5");
        let root = file.root().unwrap();
        Group::create(&root, "sensors").unwrap();
        let node = root.open("sensors").unwrap();
        assert_eq!(node.path().to_string(), "/sensors");
        assert_eq!(node.node_type().unwrap(), NodeType::Group);
        assert!(node.is_valid());
    }

    #[test]
    fn test_same_object_same_id() {
        let file = quiet_file("ids.h5");
        let root = file.root().unwrap();
        Group::create(&root, "a").unwrap();
        Group::create(&root, "b").unwrap();
        let a1 = root.open("a").unwrap();
        let a2 = root.open("/a").unwrap();
        let b = root.open("b").unwrap();
        assert_ne!(a1.handle(), a2.handle());
        assert_eq!(a1.id().unwrap(), a2.id().unwrap());
        assert_ne!(a1.id().unwrap(), b.id().unwrap());
    }

    #[test]
    fn test_invalid_node_is_local_error() {
        let node = Node::default();
        assert!(!node.is_valid());
        let e = node.node_type().unwrap_err();
        assert!(e.is_local());
        assert!(e.message().contains("no open handle"));
    }

    #[test]
    fn test_node_type_failure_carries_stack() {
        let file = quiet_file("space.h5");
        let lib = file.library().clone();
        // A dataspace id is not an object: the info query fails natively.
        let space = lib.api().create_scalar_space();
        let node = Node::new(Handle::new(lib, space), Path::from("/not-an-object"));
        let e = node.node_type().unwrap_err();
        assert!(e.is_native());
        assert!(e.message().contains("/not-an-object"));
        assert_eq!(e.stack().map(|s| s.len()), Some(2));
    }
}
