//! `MemoryLibrary`: default `NativeApi` implementation.
//!
//! Implements the HDF5 C API contract in process: integer identifiers with
//! reference counts, a per-thread error stack that every API call clears on
//! entry, and the auto-print mode that prints and consumes the stack when a
//! call fails. Files, groups and datasets live in memory; nothing is written
//! to disk.
//!
//! Every failing call pushes two frames: the internal function that detected
//! the problem, then the API function that reports it.

pub mod codes;
mod registry;
mod stack;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use libc::c_int;

use crate::api::{ErrorVisitor, NativeApi};
use crate::types::{
    herr_t, hid_t, hsize_t, htri_t, HandleKind, NativeKind, ObjectInfo, SpaceClass, WalkDirection, FAIL,
    H5I_INVALID_HID, SUCCEED,
};

use codes::*;
use registry::Registry;
use stack::{ErrorStacks, Failure};

pub use stack::Printer;

/// Frames pushed by one failing API call.
pub const FRAMES_PER_FAILURE: usize = 2;

/// The API-level frame pushed on top of an internal failure.
struct ApiFrame {
    function: &'static str,
    major: hid_t,
    minor: hid_t,
    description: &'static str,
}

const fn api(function: &'static str, major: hid_t, minor: hid_t, description: &'static str) -> ApiFrame {
    ApiFrame { function, major, minor, description }
}

pub struct MemoryLibrary {
    registry: Mutex<Registry>,
    errors: ErrorStacks,
    /// Frames a walk visits before it reports failure.
    walk_limit: AtomicUsize,
}

impl Default for MemoryLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            errors: ErrorStacks::new(),
            walk_limit: AtomicUsize::new(usize::MAX),
        }
    }

    /// Like `new`, but counts close calls per identifier for `close_calls`.
    pub fn with_close_tracking() -> Self {
        let lib = Self::new();
        lib.lock().track_closes();
        lib
    }

    /// Make every later stack walk fail after visiting `frames` frames, the
    /// way a walk over a corrupted stack does. `None` restores full walks.
    pub fn abort_walks_after(&self, frames: Option<usize>) {
        self.walk_limit.store(frames.unwrap_or(usize::MAX), Ordering::Relaxed);
    }

    /// Route auto-print output somewhere other than stderr.
    pub fn set_printer(&self, printer: Printer) {
        self.errors.set_printer(Some(printer));
    }

    /// Restore printing to stderr.
    pub fn reset_printer(&self) {
        self.errors.set_printer(None);
    }

    /// Number of close calls issued for `id`. Always zero unless built with
    /// `with_close_tracking`.
    pub fn close_calls(&self, id: hid_t) -> u32 {
        self.lock().close_calls(id)
    }

    /// Number of live identifiers, library-owned ones excluded.
    pub fn open_count(&self) -> usize {
        self.lock().open_count()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one API call: clear the stack, run `op`, and on failure push the
    /// internal frame and the API frame, then let auto-print consume them.
    #[track_caller]
    fn call<T>(&self, frame: ApiFrame, op: impl FnOnce(&mut Registry) -> Result<T, Failure>) -> Option<T> {
        self.errors.clear();
        let result = {
            let mut reg = self.lock();
            op(&mut reg)
        };
        match result {
            Ok(v) => Some(v),
            Err(failure) => {
                self.errors.push(failure.into_record());
                self.errors
                    .push(Failure::new(frame.function, frame.major, frame.minor, frame.description).into_record());
                self.errors.report(self.name());
                None
            }
        }
    }

    #[track_caller]
    fn call_id(&self, frame: ApiFrame, op: impl FnOnce(&mut Registry) -> Result<hid_t, Failure>) -> hid_t {
        self.call(frame, op).unwrap_or(H5I_INVALID_HID)
    }

    #[track_caller]
    fn call_status(&self, frame: ApiFrame, op: impl FnOnce(&mut Registry) -> Result<(), Failure>) -> herr_t {
        self.call(frame, op).map_or(FAIL, |_| SUCCEED)
    }

    #[track_caller]
    fn call_bool(&self, frame: ApiFrame, op: impl FnOnce(&mut Registry) -> Result<bool, Failure>) -> htri_t {
        self.call(frame, op).map_or(FAIL, c_int::from)
    }
}

impl NativeApi for MemoryLibrary {
    fn name(&self) -> &str {
        "memory"
    }

    // ── Identifiers ──

    fn is_valid(&self, id: hid_t) -> htri_t {
        self.call_bool(api("H5Iis_valid", MAJ_ID, MIN_BADID, "can't check ID"), |r| Ok(r.is_valid(id)))
    }

    fn identifier_kind(&self, id: hid_t) -> HandleKind {
        self.call(api("H5Iget_type", MAJ_ID, MIN_BADID, "can't get type"), |r| r.kind(id))
            .unwrap_or(HandleKind::BadId)
    }

    fn inc_ref(&self, id: hid_t) -> c_int {
        self.call(api("H5Iinc_ref", MAJ_ID, MIN_CANTINC, "can't increment ID ref count"), |r| r.inc_ref(id))
            .unwrap_or(FAIL)
    }

    fn ref_count(&self, id: hid_t) -> c_int {
        self.call(api("H5Iget_ref", MAJ_ID, MIN_CANTGET, "can't get ID ref count"), |r| r.ref_count(id))
            .unwrap_or(FAIL)
    }

    fn close(&self, id: hid_t) -> herr_t {
        let frame = match self.lock().kind(id) {
            Ok(HandleKind::File) => api("H5Fclose", MAJ_FILE, MIN_CANTCLOSEOBJ, "closing file ID failed"),
            Ok(HandleKind::Group) => api("H5Gclose", MAJ_SYM, MIN_CANTCLOSEOBJ, "not a group ID"),
            Ok(HandleKind::Dataset) => api("H5Dclose", MAJ_DATASET, MIN_CANTCLOSEOBJ, "can't decrement count on dataset ID"),
            Ok(HandleKind::Datatype) => api("H5Tclose", MAJ_DATATYPE, MIN_CANTCLOSEOBJ, "can't close datatype"),
            Ok(HandleKind::Dataspace) => api("H5Sclose", MAJ_DATASPACE, MIN_CANTCLOSEOBJ, "problem freeing id"),
            _ => api("H5Idec_ref", MAJ_ID, MIN_CANTDEC, "can't decrement ID ref count"),
        };
        self.call_status(frame, |r| r.close(id))
    }

    // ── Error stack ──

    fn set_auto_print(&self, enabled: bool) -> herr_t {
        self.errors.set_auto_print(enabled);
        SUCCEED
    }

    fn auto_print(&self) -> htri_t {
        c_int::from(self.errors.auto_print())
    }

    fn error_count(&self) -> isize {
        self.errors.len() as isize
    }

    fn walk_error_stack(&self, direction: WalkDirection, visitor: &mut ErrorVisitor<'_>) -> herr_t {
        let mut frames = self.errors.snapshot();
        if direction == WalkDirection::Downward {
            frames.reverse();
        }
        let limit = self.walk_limit.load(Ordering::Relaxed);
        for (n, frame) in frames.iter().enumerate() {
            if n >= limit || visitor(n as u32, frame) < 0 {
                return FAIL;
            }
        }
        SUCCEED
    }

    fn clear_error_stack(&self) -> herr_t {
        self.errors.clear();
        SUCCEED
    }

    fn error_class_name(&self, class_id: hid_t) -> Option<String> {
        (class_id == ERR_CLASS).then(|| ERR_CLASS_NAME.to_string())
    }

    fn error_message(&self, msg_id: hid_t) -> Option<String> {
        codes::message(msg_id).map(str::to_string)
    }

    // ── Files and objects ──

    fn create_file(&self, name: &str) -> hid_t {
        self.call_id(api("H5Fcreate", MAJ_FILE, MIN_CANTOPENFILE, "unable to create file"), |r| {
            r.create_file(name)
        })
    }

    fn open_file(&self, name: &str, writable: bool) -> hid_t {
        self.call_id(api("H5Fopen", MAJ_FILE, MIN_CANTOPENFILE, "unable to open file"), |r| {
            r.open_file(name, writable)
        })
    }

    fn open_object(&self, loc: hid_t, path: &str) -> hid_t {
        self.call_id(api("H5Oopen", MAJ_OHDR, MIN_CANTOPENOBJ, "unable to open object"), |r| {
            r.open_object(loc, path)
        })
    }

    fn link_exists(&self, loc: hid_t, path: &str) -> htri_t {
        self.call_bool(api("H5Lexists", MAJ_LINK, MIN_CANTGET, "unable to get link info"), |r| {
            r.link_exists(loc, path)
        })
    }

    fn object_info(&self, id: hid_t, info: &mut ObjectInfo) -> herr_t {
        self.call_status(api("H5Oget_info3", MAJ_OHDR, MIN_CANTGET, "can't get data model info for object"), |r| {
            *info = r.object_info(id)?;
            Ok(())
        })
    }

    fn create_group(&self, loc: hid_t, path: &str) -> hid_t {
        self.call_id(api("H5Gcreate2", MAJ_SYM, MIN_CANTINIT, "unable to create group"), |r| {
            r.create_group(loc, path)
        })
    }

    fn create_dataset(
        &self,
        loc: hid_t,
        path: &str,
        type_id: hid_t,
        space_id: hid_t,
        chunk: Option<&[hsize_t]>,
    ) -> hid_t {
        self.call_id(api("H5Dcreate2", MAJ_DATASET, MIN_CANTINIT, "unable to create dataset"), |r| {
            r.create_dataset(loc, path, type_id, space_id, chunk)
        })
    }

    fn dataset_space(&self, id: hid_t) -> hid_t {
        self.call_id(api("H5Dget_space", MAJ_DATASET, MIN_CANTGET, "unable to get dataspace"), |r| {
            r.dataset_space(id)
        })
    }

    fn dataset_type(&self, id: hid_t) -> hid_t {
        self.call_id(api("H5Dget_type", MAJ_DATASET, MIN_CANTGET, "unable to get datatype"), |r| {
            r.dataset_type(id)
        })
    }

    fn set_extent(&self, id: hid_t, dims: &[hsize_t]) -> herr_t {
        self.call_status(api("H5Dset_extent", MAJ_DATASET, MIN_CANTSET, "unable to set dataset extent"), |r| {
            r.set_extent(id, dims)
        })
    }

    fn refresh_dataset(&self, id: hid_t) -> herr_t {
        self.call_status(api("H5Drefresh", MAJ_DATASET, MIN_CANTGET, "unable to refresh dataset"), |r| {
            r.refresh(id)
        })
    }

    // ── Dataspaces ──

    fn create_scalar_space(&self) -> hid_t {
        self.call_id(api("H5Screate", MAJ_DATASPACE, MIN_CANTCREATE, "unable to create dataspace"), |r| {
            Ok(r.create_scalar_space())
        })
    }

    fn create_simple_space(&self, current: &[hsize_t], maximum: Option<&[hsize_t]>) -> hid_t {
        self.call_id(api("H5Screate_simple", MAJ_DATASPACE, MIN_CANTCREATE, "unable to create dataspace"), |r| {
            r.create_simple_space(current, maximum)
        })
    }

    fn space_class(&self, id: hid_t) -> SpaceClass {
        self.call(api("H5Sget_simple_extent_type", MAJ_ARGS, MIN_BADTYPE, "not a dataspace"), |r| {
            r.space_class(id)
        })
        .unwrap_or(SpaceClass::NoClass)
    }

    fn space_rank(&self, id: hid_t) -> c_int {
        self.call(api("H5Sget_simple_extent_ndims", MAJ_DATASPACE, MIN_CANTGET, "can't get rank"), |r| {
            Ok(r.space_dims(id)?.0.len() as c_int)
        })
        .unwrap_or(FAIL)
    }

    fn space_dims(&self, id: hid_t, current: &mut [hsize_t], maximum: &mut [hsize_t]) -> c_int {
        self.call(api("H5Sget_simple_extent_dims", MAJ_DATASPACE, MIN_CANTGET, "can't get dimensions"), |r| {
            let (cur, max) = r.space_dims(id)?;
            if current.len() < cur.len() || maximum.len() < max.len() {
                return Err(Failure::new(
                    "H5S_extent_get_dims",
                    MAJ_ARGS,
                    MIN_BADRANGE,
                    "dimension buffers smaller than the rank",
                ));
            }
            current[..cur.len()].copy_from_slice(&cur);
            maximum[..max.len()].copy_from_slice(&max);
            Ok(cur.len() as c_int)
        })
        .unwrap_or(FAIL)
    }

    // ── Datatypes ──

    fn native_type(&self, kind: NativeKind) -> hid_t {
        self.lock().native_type(kind)
    }

    fn copy_type(&self, id: hid_t) -> hid_t {
        self.call_id(api("H5Tcopy", MAJ_DATATYPE, MIN_CANTCOPY, "unable to copy datatype"), |r| r.copy_type(id))
    }

    fn type_size(&self, id: hid_t) -> usize {
        self.call(api("H5Tget_size", MAJ_DATATYPE, MIN_CANTGET, "not a datatype"), |r| r.type_size(id))
            .unwrap_or(0)
    }

    fn types_equal(&self, a: hid_t, b: hid_t) -> htri_t {
        self.call_bool(api("H5Tequal", MAJ_DATATYPE, MIN_CANTCOMPARE, "not a datatype"), |r| r.types_equal(a, b))
    }
}
