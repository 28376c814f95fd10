//! Identifier table and object store behind `MemoryLibrary`.
//!
//! Every live identifier maps to an `IdEntry` carrying its category, its
//! reference count and what it points at. Files own a flat object table
//! addressed by `u64` "addresses"; groups hold name → address links.
//!
//! File and object ids remember the access intent of the file id they were
//! reached through; writes through a read-only id fail.

use std::collections::{BTreeMap, HashMap};

use super::codes::*;
use super::stack::Failure;
use crate::types::{hid_t, hsize_t, HandleKind, NativeKind, NodeType, ObjectInfo, SpaceClass, H5S_UNLIMITED};

/// First identifier handed out. Keeps object ids clear of error-message ids.
pub(crate) const FIRST_ID: hid_t = 1 << 24;

/// Address of the root group in every file.
const ROOT_ADDR: u64 = 0;

type OpResult<T> = Result<T, Failure>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SpaceData {
    pub class: SpaceClass,
    pub current: Vec<hsize_t>,
    pub maximum: Vec<hsize_t>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TypeData {
    pub kind: NativeKind,
}

#[derive(Debug)]
struct DatasetData {
    dtype: TypeData,
    space: SpaceData,
    chunked: bool,
}

#[derive(Debug)]
enum Object {
    Group(BTreeMap<String, u64>),
    Dataset(DatasetData),
}

#[derive(Debug)]
struct FileData {
    name: String,
    fileno: u64,
    objects: HashMap<u64, Object>,
    next_addr: u64,
}

impl FileData {
    fn new(name: &str, fileno: u64) -> Self {
        let mut objects = HashMap::new();
        objects.insert(ROOT_ADDR, Object::Group(BTreeMap::new()));
        Self {
            name: name.to_string(),
            fileno,
            objects,
            next_addr: ROOT_ADDR + 1,
        }
    }
}

#[derive(Debug, Clone)]
enum Target {
    File { file: usize, writable: bool },
    Object { file: usize, addr: u64, writable: bool },
    Space(SpaceData),
    Type(TypeData),
}

#[derive(Debug)]
struct IdEntry {
    kind: HandleKind,
    refs: i32,
    target: Target,
    /// Library-owned (predefined types): cannot be closed.
    permanent: bool,
}

#[derive(Debug)]
pub(crate) struct Registry {
    next_id: hid_t,
    ids: HashMap<hid_t, IdEntry>,
    files: Vec<FileData>,
    natives: Vec<(NativeKind, hid_t)>,
    /// Per-id close counts, only kept once `track_closes` is called.
    close_calls: Option<HashMap<hid_t, u32>>,
    next_fileno: u64,
}

impl Registry {
    pub fn new() -> Self {
        let mut reg = Self {
            next_id: FIRST_ID,
            ids: HashMap::new(),
            files: Vec::new(),
            natives: Vec::new(),
            close_calls: None,
            next_fileno: 1,
        };
        for kind in NativeKind::ALL {
            let id = reg.insert(HandleKind::Datatype, Target::Type(TypeData { kind }));
            if let Some(entry) = reg.ids.get_mut(&id) {
                entry.permanent = true;
            }
            reg.natives.push((kind, id));
        }
        reg
    }

    fn insert(&mut self, kind: HandleKind, target: Target) -> hid_t {
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(id, IdEntry { kind, refs: 1, target, permanent: false });
        id
    }

    fn entry(&self, function: &'static str, id: hid_t) -> OpResult<&IdEntry> {
        self.ids
            .get(&id)
            .ok_or_else(|| Failure::new(function, MAJ_ID, MIN_BADID, format!("not a valid identifier: {}", id)))
    }

    // ── Identifiers ──

    pub fn is_valid(&self, id: hid_t) -> bool {
        self.ids.contains_key(&id)
    }

    pub fn kind(&self, id: hid_t) -> OpResult<HandleKind> {
        Ok(self.entry("H5I__get_type", id)?.kind)
    }

    pub fn inc_ref(&mut self, id: hid_t) -> OpResult<i32> {
        let entry = self
            .ids
            .get_mut(&id)
            .ok_or_else(|| Failure::new("H5I_inc_ref", MAJ_ID, MIN_BADID, "can't locate ID"))?;
        entry.refs += 1;
        Ok(entry.refs)
    }

    pub fn ref_count(&self, id: hid_t) -> OpResult<i32> {
        Ok(self.entry("H5I_get_ref", id)?.refs)
    }

    pub fn close(&mut self, id: hid_t) -> OpResult<()> {
        let entry = self
            .ids
            .get_mut(&id)
            .ok_or_else(|| Failure::new("H5I_dec_app_ref", MAJ_ID, MIN_CANTDEC, "can't locate ID"))?;
        if entry.permanent {
            return Err(Failure::new(
                "H5T_close",
                MAJ_DATATYPE,
                MIN_CANTCLOSEOBJ,
                "immutable datatype - can't close",
            ));
        }
        entry.refs -= 1;
        if entry.refs <= 0 {
            self.ids.remove(&id);
        }
        if let Some(log) = self.close_calls.as_mut() {
            *log.entry(id).or_insert(0) += 1;
        }
        Ok(())
    }

    pub fn track_closes(&mut self) {
        self.close_calls.get_or_insert_with(HashMap::new);
    }

    pub fn close_calls(&self, id: hid_t) -> u32 {
        self.close_calls
            .as_ref()
            .and_then(|log| log.get(&id))
            .copied()
            .unwrap_or(0)
    }

    /// Live identifiers, library-owned ones excluded.
    pub fn open_count(&self) -> usize {
        self.ids.values().filter(|e| !e.permanent).count()
    }

    // ── Files ──

    pub fn create_file(&mut self, name: &str) -> OpResult<hid_t> {
        if name.is_empty() {
            return Err(Failure::new("H5F_open", MAJ_ARGS, MIN_BADVALUE, "invalid file name"));
        }
        let existing = self.files.iter().position(|f| f.name == name);
        if existing.is_some_and(|i| self.file_in_use(i)) {
            return Err(Failure::new(
                "H5F_open",
                MAJ_FILE,
                MIN_CANTOPENFILE,
                "unable to truncate a file which is already open",
            ));
        }
        let fileno = self.next_fileno;
        self.next_fileno += 1;
        let index = match existing {
            Some(i) => {
                self.files[i] = FileData::new(name, fileno);
                i
            }
            None => {
                self.files.push(FileData::new(name, fileno));
                self.files.len() - 1
            }
        };
        Ok(self.insert(HandleKind::File, Target::File { file: index, writable: true }))
    }

    /// True while any live id refers to the file or an object in it.
    fn file_in_use(&self, index: usize) -> bool {
        self.ids.values().any(|e| {
            matches!(&e.target, Target::File { file, .. } | Target::Object { file, .. } if *file == index)
        })
    }

    pub fn open_file(&mut self, name: &str, writable: bool) -> OpResult<hid_t> {
        let index = self.files.iter().position(|f| f.name == name).ok_or_else(|| {
            Failure::new(
                "H5F_open",
                MAJ_FILE,
                MIN_CANTOPENFILE,
                format!("unable to open file: name = '{}'", name),
            )
        })?;
        Ok(self.insert(HandleKind::File, Target::File { file: index, writable }))
    }

    // ── Path resolution ──

    /// The (file, address, intent) a location id stands for. File ids stand
    /// for their root group.
    fn location(&self, function: &'static str, loc: hid_t) -> OpResult<(usize, u64, bool)> {
        match &self.entry(function, loc)?.target {
            Target::File { file, writable } => Ok((*file, ROOT_ADDR, *writable)),
            Target::Object { file, addr, writable } => Ok((*file, *addr, *writable)),
            _ => Err(Failure::new(function, MAJ_ARGS, MIN_BADTYPE, "not a location")),
        }
    }

    fn require_write(&self, function: &'static str, id: hid_t) -> OpResult<()> {
        if self.location(function, id)?.2 {
            Ok(())
        } else {
            Err(Failure::new("H5F__check_intent", MAJ_FILE, MIN_WRITEERROR, "no write intent on file"))
        }
    }

    fn split(path: &str) -> Vec<&str> {
        path.split('/').filter(|c| !c.is_empty() && *c != ".").collect()
    }

    fn resolve(&self, function: &'static str, loc: hid_t, path: &str) -> OpResult<(usize, u64, bool)> {
        let (file, mut addr, writable) = self.location(function, loc)?;
        if path.starts_with('/') {
            addr = ROOT_ADDR;
        }
        let data = &self.files[file];
        for name in Self::split(path) {
            addr = match data.objects.get(&addr) {
                Some(Object::Group(links)) => *links.get(name).ok_or_else(|| {
                    Failure::new(
                        "H5G__traverse_real",
                        MAJ_SYM,
                        MIN_NOTFOUND,
                        format!("component not found: '{}'", name),
                    )
                })?,
                _ => {
                    return Err(Failure::new(
                        "H5G__traverse_real",
                        MAJ_SYM,
                        MIN_BADTYPE,
                        format!("'{}' is reached through a non-group object", name),
                    ))
                }
            };
        }
        Ok((file, addr, writable))
    }

    /// Resolve everything but the last component, which must not exist yet.
    fn resolve_new(&self, function: &'static str, loc: hid_t, path: &str) -> OpResult<(usize, u64, String)> {
        let mut parts = Self::split(path);
        let name = parts
            .pop()
            .ok_or_else(|| Failure::new(function, MAJ_ARGS, MIN_BADVALUE, "no name given"))?
            .to_string();
        let mut parent = parts.join("/");
        if path.starts_with('/') {
            parent.insert(0, '/');
        }
        let (file, addr, _) = self.resolve(function, loc, &parent)?;
        match self.files[file].objects.get(&addr) {
            Some(Object::Group(links)) if links.contains_key(&name) => Err(Failure::new(
                "H5L__link_cb",
                MAJ_LINK,
                MIN_EXISTS,
                format!("name already exists: '{}'", name),
            )),
            Some(Object::Group(_)) => Ok((file, addr, name)),
            _ => Err(Failure::new(function, MAJ_SYM, MIN_BADTYPE, "parent is not a group")),
        }
    }

    fn link(&mut self, file: usize, parent: u64, name: String, object: Object) -> u64 {
        let data = &mut self.files[file];
        let addr = data.next_addr;
        data.next_addr += 1;
        data.objects.insert(addr, object);
        if let Some(Object::Group(links)) = data.objects.get_mut(&parent) {
            links.insert(name, addr);
        }
        addr
    }

    fn open_addr(&mut self, file: usize, addr: u64, writable: bool) -> hid_t {
        let kind = match self.files[file].objects.get(&addr) {
            Some(Object::Dataset(_)) => HandleKind::Dataset,
            _ => HandleKind::Group,
        };
        self.insert(kind, Target::Object { file, addr, writable })
    }

    // ── Objects ──

    pub fn open_object(&mut self, loc: hid_t, path: &str) -> OpResult<hid_t> {
        let (file, addr, writable) = self.resolve("H5O_open_name", loc, path)?;
        Ok(self.open_addr(file, addr, writable))
    }

    pub fn link_exists(&self, loc: hid_t, path: &str) -> OpResult<bool> {
        self.location("H5L_exists", loc)?;
        Ok(self.resolve("H5L_exists", loc, path).is_ok())
    }

    pub fn object_info(&self, id: hid_t) -> OpResult<ObjectInfo> {
        let (file, addr, _) = self.location("H5O_get_info", id)?;
        let data = &self.files[file];
        let node_type = match data.objects.get(&addr) {
            Some(Object::Group(_)) => NodeType::Group,
            Some(Object::Dataset(_)) => NodeType::Dataset,
            None => {
                return Err(Failure::new("H5O_get_info", MAJ_OHDR, MIN_NOTFOUND, "object header missing"))
            }
        };
        let mut token = [0u8; 16];
        token[..8].copy_from_slice(&addr.to_le_bytes());
        Ok(ObjectInfo {
            fileno: data.fileno,
            token,
            node_type,
            ref_count: 1,
        })
    }

    pub fn create_group(&mut self, loc: hid_t, path: &str) -> OpResult<hid_t> {
        let (file, parent, name) = self.resolve_new("H5G__create_named", loc, path)?;
        self.require_write("H5G__create_named", loc)?;
        let addr = self.link(file, parent, name, Object::Group(BTreeMap::new()));
        Ok(self.insert(HandleKind::Group, Target::Object { file, addr, writable: true }))
    }

    fn space(&self, function: &'static str, id: hid_t) -> OpResult<&SpaceData> {
        match &self.entry(function, id)?.target {
            Target::Space(space) => Ok(space),
            _ => Err(Failure::new(function, MAJ_ARGS, MIN_BADTYPE, "not a dataspace")),
        }
    }

    fn dtype(&self, function: &'static str, id: hid_t) -> OpResult<TypeData> {
        match &self.entry(function, id)?.target {
            Target::Type(t) => Ok(*t),
            _ => Err(Failure::new(function, MAJ_ARGS, MIN_BADTYPE, "not a datatype")),
        }
    }

    pub fn create_dataset(
        &mut self,
        loc: hid_t,
        path: &str,
        type_id: hid_t,
        space_id: hid_t,
        chunk: Option<&[hsize_t]>,
    ) -> OpResult<hid_t> {
        const F: &str = "H5D__create_named";
        let dtype = self.dtype(F, type_id)?;
        let space = self.space(F, space_id)?.clone();
        let extendible = space.current != space.maximum;
        match chunk {
            Some(shape) => {
                if space.class != SpaceClass::Simple || shape.len() != space.current.len() {
                    return Err(Failure::new(
                        "H5D__chunk_construct",
                        MAJ_DATASET,
                        MIN_BADVALUE,
                        "dimensionality of chunks doesn't match the dataspace",
                    ));
                }
                if shape.iter().any(|&c| c == 0) {
                    return Err(Failure::new(
                        "H5D__chunk_construct",
                        MAJ_DATASET,
                        MIN_BADVALUE,
                        "all chunk dimensions must be positive",
                    ));
                }
            }
            None if extendible => {
                return Err(Failure::new(
                    "H5D__init_space",
                    MAJ_DATASET,
                    MIN_CANTINIT,
                    "extendible contiguous non-external dataset not allowed",
                ))
            }
            None => {}
        }
        let (file, parent, name) = self.resolve_new(F, loc, path)?;
        self.require_write(F, loc)?;
        let object = Object::Dataset(DatasetData {
            dtype,
            space,
            chunked: chunk.is_some(),
        });
        let addr = self.link(file, parent, name, object);
        Ok(self.insert(HandleKind::Dataset, Target::Object { file, addr, writable: true }))
    }

    fn dataset(&self, function: &'static str, id: hid_t) -> OpResult<&DatasetData> {
        let (file, addr) = match &self.entry(function, id)?.target {
            Target::Object { file, addr, .. } => (*file, *addr),
            _ => return Err(Failure::new(function, MAJ_ARGS, MIN_BADTYPE, "not a dataset")),
        };
        match self.files[file].objects.get(&addr) {
            Some(Object::Dataset(d)) => Ok(d),
            _ => Err(Failure::new(function, MAJ_ARGS, MIN_BADTYPE, "not a dataset")),
        }
    }

    pub fn dataset_space(&mut self, id: hid_t) -> OpResult<hid_t> {
        let space = self.dataset("H5D__get_space", id)?.space.clone();
        Ok(self.insert(HandleKind::Dataspace, Target::Space(space)))
    }

    pub fn dataset_type(&mut self, id: hid_t) -> OpResult<hid_t> {
        let dtype = self.dataset("H5D__get_type", id)?.dtype;
        Ok(self.insert(HandleKind::Datatype, Target::Type(dtype)))
    }

    pub fn refresh(&self, id: hid_t) -> OpResult<()> {
        self.dataset("H5D__refresh", id).map(|_| ())
    }

    pub fn set_extent(&mut self, id: hid_t, dims: &[hsize_t]) -> OpResult<()> {
        const F: &str = "H5D__set_extent";
        let (file, addr, writable) = match &self.entry(F, id)?.target {
            Target::Object { file, addr, writable } => (*file, *addr, *writable),
            _ => return Err(Failure::new(F, MAJ_ARGS, MIN_BADTYPE, "not a dataset")),
        };
        let data = match self.files[file].objects.get_mut(&addr) {
            Some(Object::Dataset(d)) => d,
            _ => return Err(Failure::new(F, MAJ_ARGS, MIN_BADTYPE, "not a dataset")),
        };
        if !writable {
            return Err(Failure::new("H5F__check_intent", MAJ_FILE, MIN_WRITEERROR, "no write intent on file"));
        }
        if dims.len() != data.space.current.len() {
            return Err(Failure::new(F, MAJ_ARGS, MIN_BADVALUE, "rank of the new extent doesn't match"));
        }
        if dims == data.space.current.as_slice() {
            return Ok(());
        }
        if !data.chunked {
            return Err(Failure::new(F, MAJ_DATASET, MIN_CANTINIT, "dataset has fixed size"));
        }
        let exceeds = dims
            .iter()
            .zip(&data.space.maximum)
            .any(|(&d, &max)| max != H5S_UNLIMITED && d > max);
        if exceeds {
            return Err(Failure::new(
                "H5S_set_extent",
                MAJ_DATASPACE,
                MIN_BADRANGE,
                "dimension cannot exceed the existing maximal size",
            ));
        }
        data.space.current = dims.to_vec();
        Ok(())
    }

    // ── Dataspaces ──

    pub fn create_scalar_space(&mut self) -> hid_t {
        let space = SpaceData {
            class: SpaceClass::Scalar,
            current: Vec::new(),
            maximum: Vec::new(),
        };
        self.insert(HandleKind::Dataspace, Target::Space(space))
    }

    pub fn create_simple_space(&mut self, current: &[hsize_t], maximum: Option<&[hsize_t]>) -> OpResult<hid_t> {
        const F: &str = "H5S_create_simple";
        if current.is_empty() {
            return Err(Failure::new(F, MAJ_ARGS, MIN_BADRANGE, "invalid rank"));
        }
        let maximum = maximum.map(<[hsize_t]>::to_vec).unwrap_or_else(|| current.to_vec());
        if maximum.len() != current.len() {
            return Err(Failure::new(F, MAJ_ARGS, MIN_BADVALUE, "rank of maxdims doesn't match dims"));
        }
        if current.iter().zip(&maximum).any(|(&c, &m)| m != H5S_UNLIMITED && c > m) {
            return Err(Failure::new(F, MAJ_ARGS, MIN_BADVALUE, "maxdims is smaller than dims"));
        }
        let space = SpaceData {
            class: SpaceClass::Simple,
            current: current.to_vec(),
            maximum,
        };
        Ok(self.insert(HandleKind::Dataspace, Target::Space(space)))
    }

    pub fn space_class(&self, id: hid_t) -> OpResult<SpaceClass> {
        Ok(self.space("H5S_get_simple_extent_type", id)?.class)
    }

    pub fn space_dims(&self, id: hid_t) -> OpResult<(Vec<hsize_t>, Vec<hsize_t>)> {
        let space = self.space("H5S_get_simple_extent_dims", id)?;
        Ok((space.current.clone(), space.maximum.clone()))
    }

    // ── Datatypes ──

    pub fn native_type(&self, kind: NativeKind) -> hid_t {
        self.natives
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, id)| *id)
            .unwrap_or(crate::types::H5I_INVALID_HID)
    }

    pub fn copy_type(&mut self, id: hid_t) -> OpResult<hid_t> {
        let dtype = self.dtype("H5T_copy", id)?;
        Ok(self.insert(HandleKind::Datatype, Target::Type(dtype)))
    }

    pub fn type_size(&self, id: hid_t) -> OpResult<usize> {
        Ok(self.dtype("H5T_get_size", id)?.kind.size())
    }

    pub fn types_equal(&self, a: hid_t, b: hid_t) -> OpResult<bool> {
        Ok(self.dtype("H5T_cmp", a)? == self.dtype("H5T_cmp", b)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refcount_and_close() {
        let mut reg = Registry::new();
        reg.track_closes();
        let f = reg.create_file("a.h5").unwrap();
        assert_eq!(reg.inc_ref(f).unwrap(), 2);
        reg.close(f).unwrap();
        assert!(reg.is_valid(f));
        reg.close(f).unwrap();
        assert!(!reg.is_valid(f));
        assert_eq!(reg.close_calls(f), 2);
        assert!(reg.close(f).is_err());
    }

    #[test]
    fn test_natives_are_permanent() {
        let mut reg = Registry::new();
        let t = reg.native_type(NativeKind::Int32);
        assert!(reg.close(t).is_err());
        assert!(reg.is_valid(t));
        assert_eq!(reg.open_count(), 0);
    }

    #[test]
    fn test_nested_paths() {
        let mut reg = Registry::new();
        let f = reg.create_file("p.h5").unwrap();
        reg.create_group(f, "a").unwrap();
        reg.create_group(f, "/a/b").unwrap();
        assert!(reg.link_exists(f, "a/b").unwrap());
        assert!(!reg.link_exists(f, "a/c").unwrap());
        assert!(reg.create_group(f, "a/b").is_err());
        assert!(reg.create_group(f, "x/y").is_err());
        let b = reg.open_object(f, "/a/b").unwrap();
        assert_eq!(reg.kind(b).unwrap(), HandleKind::Group);
    }

    #[test]
    fn test_extendible_needs_chunks() {
        let mut reg = Registry::new();
        let f = reg.create_file("d.h5").unwrap();
        let t = reg.native_type(NativeKind::Float64);
        let s = reg.create_simple_space(&[10], Some(&[H5S_UNLIMITED])).unwrap();
        assert!(reg.create_dataset(f, "x", t, s, None).is_err());
        let d = reg.create_dataset(f, "x", t, s, Some(&[4])).unwrap();
        reg.set_extent(d, &[25]).unwrap();
        let sp = reg.dataset_space(d).unwrap();
        assert_eq!(reg.space_dims(sp).unwrap().0, vec![25]);
    }

    #[test]
    fn test_fixed_dataset_cannot_grow() {
        let mut reg = Registry::new();
        let f = reg.create_file("e.h5").unwrap();
        let t = reg.native_type(NativeKind::Int8);
        let s = reg.create_simple_space(&[3], None).unwrap();
        let d = reg.create_dataset(f, "x", t, s, None).unwrap();
        assert!(reg.set_extent(d, &[4]).is_err());
        assert!(reg.set_extent(d, &[3]).is_ok());
    }

    #[test]
    fn test_close_counts_off_by_default() {
        let mut reg = Registry::new();
        let f = reg.create_file("quiet.h5").unwrap();
        reg.close(f).unwrap();
        assert_eq!(reg.close_calls(f), 0);
    }

    #[test]
    fn test_recreate_refused_while_open() {
        let mut reg = Registry::new();
        let f = reg.create_file("t.h5").unwrap();
        reg.create_group(f, "g").unwrap();
        let g = reg.open_object(f, "g").unwrap();
        reg.close(f).unwrap();

        // The group id still pins the file.
        let err = reg.create_file("t.h5").unwrap_err();
        assert_eq!(err.minor, MIN_CANTOPENFILE);
        assert_eq!(reg.object_info(g).unwrap().node_type, NodeType::Group);

        reg.close(g).unwrap();
        let again = reg.create_file("t.h5").unwrap();
        assert!(!reg.link_exists(again, "g").unwrap());
    }

    #[test]
    fn test_read_only_ids_refuse_writes() {
        let mut reg = Registry::new();
        let w = reg.create_file("ro.h5").unwrap();
        let t = reg.native_type(NativeKind::Int16);
        let s = reg.create_simple_space(&[2], Some(&[H5S_UNLIMITED])).unwrap();
        reg.create_dataset(w, "d", t, s, Some(&[2])).unwrap();
        reg.close(w).unwrap();

        let r = reg.open_file("ro.h5", false).unwrap();
        assert_eq!(reg.create_group(r, "g").unwrap_err().minor, MIN_WRITEERROR);
        assert_eq!(reg.create_dataset(r, "e", t, s, Some(&[2])).unwrap_err().minor, MIN_WRITEERROR);
        let d = reg.open_object(r, "d").unwrap();
        assert_eq!(reg.set_extent(d, &[4]).unwrap_err().minor, MIN_WRITEERROR);

        let rw = reg.open_file("ro.h5", true).unwrap();
        let d = reg.open_object(rw, "/d").unwrap();
        reg.set_extent(d, &[4]).unwrap();
        reg.create_group(rw, "g").unwrap();
    }
}
