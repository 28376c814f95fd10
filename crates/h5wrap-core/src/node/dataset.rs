use h5wrap_sys::{hsize_t, NodeType, SpaceClass};

use super::{ensure_type, Group, Node, Path};
use crate::dataspace::Dataspace;
use crate::datatype::Datatype;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::library::Library;

#[derive(Debug, Clone)]
pub struct Dataset {
    node: Node,
}

impl TryFrom<Node> for Dataset {
    type Error = Error;

    fn try_from(node: Node) -> Result<Self> {
        ensure_type(&node, NodeType::Dataset)?;
        Ok(Self { node })
    }
}

impl AsRef<Node> for Dataset {
    fn as_ref(&self) -> &Node {
        &self.node
    }
}

impl Dataset {
    /// Create a dataset at `path` below `parent`. A growable dataspace needs
    /// a `chunk` shape of the same rank.
    pub fn create(
        parent: &Group,
        path: impl Into<Path>,
        datatype: &Datatype,
        dataspace: &Dataspace,
        chunk: Option<&[hsize_t]>,
    ) -> Result<Dataset> {
        let path = path.into();
        let lib = parent.node().library()?;
        let id = lib.api().create_dataset(
            parent.node().handle().id(),
            &path.to_string(),
            datatype.handle().id(),
            dataspace.handle().id(),
            chunk,
        );
        if id < 0 {
            return lib
                .errors()
                .fail(format!("failed to create dataset {}", parent.path().join(&path)));
        }
        Handle::new(lib.clone(), id).close()?;
        Dataset::try_from(parent.open(path)?)
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

    fn library(&self) -> Result<&Library> {
        self.node.library()
    }

    /// Current dataspace (a fresh copy on every call).
    pub fn dataspace(&self) -> Result<Dataspace> {
        let lib = self.library()?;
        let id = lib.api().dataset_space(self.node.handle().id());
        if id < 0 {
            return lib
                .errors()
                .fail(format!("failed to retrieve dataspace of dataset {}", self.path()));
        }
        Dataspace::from_handle(Handle::new(lib.clone(), id))
    }

    pub fn datatype(&self) -> Result<Datatype> {
        let lib = self.library()?;
        let id = lib.api().dataset_type(self.node.handle().id());
        if id < 0 {
            return lib
                .errors()
                .fail(format!("failed to retrieve datatype of dataset {}", self.path()));
        }
        Datatype::from_handle(Handle::new(lib.clone(), id))
    }

    /// Set the full extent. `dims` must have one entry per dimension.
    pub fn resize(&self, dims: &[hsize_t]) -> Result<()> {
        let rank = self.dataspace()?.rank()?;
        crate::ensure_local!(
            dims.len() == rank,
            "new extent {:?} for dataset {} has {} dimensions, the dataset has {}",
            dims,
            self.path(),
            dims.len(),
            rank
        );
        let lib = self.library()?;
        if lib.api().set_extent(self.node.handle().id(), dims) < 0 {
            return lib
                .errors()
                .fail(format!("failed to resize dataset {} to {:?}", self.path(), dims));
        }
        crate::kdebug!("resized {} to {:?}", self.path(), dims);
        Ok(())
    }

    /// Grow or shrink dimension `index` by `delta`.
    pub fn extent(&self, index: usize, delta: i64) -> Result<()> {
        resize_by(self, index, delta)
    }

    /// Reload metadata written by another handle (SWMR readers).
    pub fn refresh(&self) -> Result<()> {
        let lib = self.library()?;
        if lib.api().refresh_dataset(self.node.handle().id()) < 0 {
            return lib.errors().fail(format!("failed to refresh dataset {}", self.path()));
        }
        Ok(())
    }
}

/// Change one dimension of `dataset` by `delta`, keeping the others.
///
/// Fails locally, without touching the dataset, when the dataspace is not
/// simple, `index` is out of range or the new extent would be negative.
pub fn resize_by(dataset: &Dataset, index: usize, delta: i64) -> Result<()> {
    let space = dataset.dataspace()?;
    crate::ensure_local!(
        space.space_type()? == SpaceClass::Simple,
        "dataset {} does not have a simple dataspace",
        dataset.path()
    );
    let mut dims = space.current_dimensions()?;
    crate::ensure_local!(
        index < dims.len(),
        "dimension index {} exceeds the rank {} of dataset {}",
        index,
        dims.len(),
        dataset.path()
    );
    let current = dims[index];
    let resized = if delta >= 0 {
        current.checked_add(delta.unsigned_abs())
    } else {
        current.checked_sub(delta.unsigned_abs())
    };
    dims[index] = match resized {
        Some(n) => n,
        None if delta < 0 => {
            return Err(crate::local_err!(
                "changing dimension {} of dataset {} by {} would make it negative",
                index,
                dataset.path(),
                delta
            ))
        }
        None => {
            return Err(crate::local_err!(
                "changing dimension {} of dataset {} by {} overflows",
                index,
                dataset.path(),
                delta
            ))
        }
    };
    dataset.resize(&dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::File;
    use h5wrap_sys::MemoryLibrary;
    use std::sync::Arc;

    struct Fixture {
        mem: Arc<MemoryLibrary>,
        _file: File,
        root: Group,
    }

    fn fixture() -> Fixture {
        let mem = Arc::new(MemoryLibrary::new());
        let lib = Library::from_arc(mem.clone());
        lib.errors().set_auto_print(false).unwrap();
        let file = File::create(&lib, "datasets.h5").unwrap();
        let root = file.root().unwrap();
        Fixture { mem, _file: file, root }
    }

    fn growable(root: &Group, path: &str, len: hsize_t) -> Dataset {
        let lib = root.node().library().unwrap();
        let t = Datatype::native::<f64>(lib).unwrap();
        let s = Dataspace::simple(lib, &[len], Some(&[Dataspace::UNLIMITED])).unwrap();
        Dataset::create(root, path, &t, &s, Some(&[16])).unwrap()
    }

    fn dims(d: &Dataset) -> Vec<hsize_t> {
        d.dataspace().unwrap().current_dimensions().unwrap()
    }

    #[test]
    fn test_create_reopens_by_path() {
        let f = fixture();
        let d = growable(&f.root, "events", 10);
        assert!(d.is_valid());
        assert_eq!(d.path().to_string(), "/events");
        assert_eq!(d.node().node_type().unwrap(), NodeType::Dataset);
        // Dataset, root and file stay open; the creation id was released.
        assert_eq!(f.mem.open_count(), 3);
    }

    #[test]
    fn test_resize_by_delta() {
        let f = fixture();
        let d = growable(&f.root, "grow", 10);

        let e = resize_by(&d, 0, -15).unwrap_err();
        assert!(e.is_local());
        assert_eq!(dims(&d), vec![10]);

        resize_by(&d, 0, 5).unwrap();
        assert_eq!(dims(&d), vec![15]);

        d.extent(0, -15).unwrap();
        assert_eq!(dims(&d), vec![0]);
    }

    #[test]
    fn test_resize_rank_mismatch_is_local() {
        let f = fixture();
        let d = growable(&f.root, "ranked", 6);
        let e = d.resize(&[]).unwrap_err();
        assert!(e.is_local());
        assert!(e.stack().is_none());
        assert!(d.resize(&[7, 7]).unwrap_err().message().contains("has 2 dimensions"));
        assert_eq!(dims(&d), vec![6]);

        d.resize(&[7]).unwrap();
        assert_eq!(dims(&d), vec![7]);
    }

    #[test]
    fn test_read_only_dataset_refuses_resize() {
        let f = fixture();
        let lib = f.root.node().library().unwrap().clone();
        growable(&f.root, "frozen", 3);

        let ro = File::open(&lib, "datasets.h5").unwrap();
        let d = Dataset::try_from(ro.root().unwrap().open("frozen").unwrap()).unwrap();
        let e = d.extent(0, 1).unwrap_err();
        assert!(e.is_native());
        assert_eq!(e.stack().map(|s| s.len()), Some(2));
        assert_eq!(dims(&d), vec![3]);
    }

    #[test]
    fn test_resize_by_bad_index() {
        let f = fixture();
        let d = growable(&f.root, "idx", 4);
        let e = d.extent(1, 1).unwrap_err();
        assert!(e.is_local());
        assert!(e.message().contains("rank 1"));
    }

    #[test]
    fn test_resize_by_scalar_rejected() {
        let f = fixture();
        let lib = f.root.node().library().unwrap();
        let t = Datatype::native::<u8>(lib).unwrap();
        let s = Dataspace::scalar(lib).unwrap();
        let d = Dataset::create(&f.root, "flag", &t, &s, None).unwrap();
        let e = d.extent(0, 1).unwrap_err();
        assert!(e.is_local());
        assert!(e.message().contains("simple dataspace"));
    }

    #[test]
    fn test_fixed_size_resize_is_native_failure() {
        let f = fixture();
        let lib = f.root.node().library().unwrap();
        let t = Datatype::native::<i16>(lib).unwrap();
        let s = Dataspace::simple(lib, &[8], None).unwrap();
        let d = Dataset::create(&f.root, "fixed", &t, &s, None).unwrap();
        let e = d.resize(&[9]).unwrap_err();
        assert!(e.is_native());
        assert_eq!(e.stack().map(|s| s.len()), Some(2));
        assert_eq!(dims(&d), vec![8]);
    }

    #[test]
    fn test_growable_without_chunk_fails() {
        let f = fixture();
        let lib = f.root.node().library().unwrap();
        let t = Datatype::native::<i16>(lib).unwrap();
        let s = Dataspace::simple(lib, &[8], Some(&[Dataspace::UNLIMITED])).unwrap();
        let e = Dataset::create(&f.root, "contig", &t, &s, None).unwrap_err();
        assert_eq!(e.message(), "failed to create dataset /contig");
        assert!(!f.root.exists("contig").unwrap());
    }

    #[test]
    fn test_datatype_and_refresh() {
        let f = fixture();
        let d = growable(&f.root, "typed", 2);
        let lib = f.root.node().library().unwrap();
        let expected = Datatype::native::<f64>(lib).unwrap();
        assert!(d.datatype().unwrap().equals(&expected).unwrap());
        d.refresh().unwrap();
    }

    #[test]
    fn test_group_node_is_not_a_dataset() {
        let f = fixture();
        Group::create(&f.root, "g").unwrap();
        let e = Dataset::try_from(f.root.open("g").unwrap()).unwrap_err();
        assert!(e.is_local());
        assert!(e.message().contains("/g"));
    }
}
