use h5wrap_sys::NodeType;

use super::{ensure_type, Node, Path};
use crate::error::{Error, Result};
use crate::handle::Handle;

#[derive(Debug, Clone)]
pub struct Group {
    node: Node,
}

impl TryFrom<Node> for Group {
    type Error = Error;

    fn try_from(node: Node) -> Result<Self> {
        ensure_type(&node, NodeType::Group)?;
        Ok(Self { node })
    }
}

impl AsRef<Node> for Group {
    fn as_ref(&self) -> &Node {
        &self.node
    }
}

impl Group {
    /// Create a group at `path` below `parent`. Intermediate groups must
    /// already exist.
    pub fn create(parent: &Group, path: impl Into<Path>) -> Result<Group> {
        let path = path.into();
        let lib = parent.node.library()?;
        let id = lib.api().create_group(parent.node.handle().id(), &path.to_string());
        if id < 0 {
            return lib
                .errors()
                .fail(format!("failed to create group {}", parent.path().join(&path)));
        }
        Handle::new(lib.clone(), id).close()?;
        Group::try_from(parent.open(path)?)
    }

    /// Open whatever object lives at `path`.
    pub fn open(&self, path: impl Into<Path>) -> Result<Node> {
        let path = path.into();
        let full = self.path().join(&path);
        let lib = self.node.library()?;
        let id = lib.api().open_object(self.node.handle().id(), &path.to_string());
        if id < 0 {
            return lib.errors().fail(format!("failed to open object {}", full));
        }
        Ok(Node::new(Handle::new(lib.clone(), id), full))
    }

    pub fn exists(&self, path: impl Into<Path>) -> Result<bool> {
        let path = path.into();
        let lib = self.node.library()?;
        match lib.api().link_exists(self.node.handle().id(), &path.to_string()) {
            r if r < 0 => lib
                .errors()
                .fail(format!("failed to check for {}", self.path().join(&path))),
            r => Ok(r > 0),
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn path(&self) -> &Path {
        self.node.path()
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataspace::Dataspace;
    use crate::datatype::Datatype;
    use crate::library::Library;
    use crate::node::{Dataset, File};

    fn root() -> (File, Group) {
        let lib = Library::memory();
        lib.errors().set_auto_print(false).unwrap();
        let file = File::create(&lib, "groups.h5").unwrap();
        let root = file.root().unwrap();
        (file, root)
    }

    #[test]
    fn test_create_nested() {
        let (_file, root) = root();
        let data = Group::create(&root, "data").unwrap();
        let run = Group::create(&data, "run1").unwrap();
        assert_eq!(run.path().to_string(), "/data/run1");
        assert!(run.is_valid());
        assert!(root.exists("data/run1").unwrap());
        assert!(!root.exists("data/run2").unwrap());
    }

    #[test]
    fn test_create_duplicate_fails() {
        let (_file, root) = root();
        Group::create(&root, "dup").unwrap();
        let e = Group::create(&root, "dup").unwrap_err();
        assert!(e.is_native());
        assert_eq!(e.message(), "failed to create group /dup");
        assert_eq!(e.stack().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_from_dataset_node_fails_naming_path() {
        let (file, root) = root();
        let lib = file.library();
        let t = Datatype::native::<i32>(lib).unwrap();
        let s = Dataspace::simple(lib, &[4], None).unwrap();
        Dataset::create(&root, "values", &t, &s, None).unwrap();

        let node = root.open("values").unwrap();
        let e = Group::try_from(node).unwrap_err();
        assert!(e.is_local());
        assert!(e.message().contains("/values"), "{}", e.message());
    }

    #[test]
    fn test_open_missing() {
        let (_file, root) = root();
        let e = root.open("nope").unwrap_err();
        assert_eq!(e.message(), "failed to open object /nope");
    }
}
