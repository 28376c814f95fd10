//! The native API boundary.
//!
//! `NativeApi` is the flat, C-shaped surface the wrapper layer calls. Every
//! method keeps the C calling convention of the function it stands for:
//! identifiers come back as `hid_t`, status as `herr_t` / `htri_t`, and a
//! negative value means the call failed and pushed frames onto the calling
//! thread's error stack.
//!
//! # Implementors
//!
//! - `MemoryLibrary` (default): in-process implementation of the contract.
//!   Per-id reference counts, per-thread error stacks, auto-print. Holds
//!   groups and datasets in memory only.
//!
//! - `LinkedLibrary` (feature = "hdf5"): forwards every call to the system
//!   `libhdf5` through `extern "C"` declarations.
//!
//! **Contract:** every call except the error-stack functions clears the
//! calling thread's error stack on entry, exactly like an HDF5 API function.
//! The error-stack functions (`set_auto_print`, `auto_print`, `error_count`,
//! `walk_error_stack`, `error_class_name`, `error_message`) leave it intact.

use libc::c_int;

use crate::types::{
    herr_t, hid_t, hsize_t, htri_t, ErrorRecord, HandleKind, NativeKind, ObjectInfo, SpaceClass,
    WalkDirection,
};

/// Visitor invoked once per error frame by `walk_error_stack`.
///
/// Receives the frame's position in walk order and the frame. Returning a
/// negative value stops the walk and makes it report failure.
pub type ErrorVisitor<'a> = dyn FnMut(u32, &ErrorRecord) -> herr_t + 'a;

pub trait NativeApi: Send + Sync {
    /// Short backend name for diagnostics.
    fn name(&self) -> &str;

    // ── Identifiers (H5I) ──

    /// `H5Iis_valid`: positive if `id` refers to a live resource.
    fn is_valid(&self, id: hid_t) -> htri_t;

    /// `H5Iget_type`. `HandleKind::BadId` on failure.
    fn identifier_kind(&self, id: hid_t) -> HandleKind;

    /// `H5Iinc_ref`: returns the new reference count.
    fn inc_ref(&self, id: hid_t) -> c_int;

    /// `H5Iget_ref`.
    fn ref_count(&self, id: hid_t) -> c_int;

    /// Release one reference, using the close function matching the id's
    /// category (`H5Fclose`, `H5Gclose`, `H5Dclose`, ...).
    fn close(&self, id: hid_t) -> herr_t;

    // ── Error stack (H5E) ──

    /// `H5Eset_auto2` on the default stack: install or remove the printer.
    fn set_auto_print(&self, enabled: bool) -> herr_t;

    /// `H5Eget_auto2`: positive when a printer is installed.
    fn auto_print(&self) -> htri_t;

    /// `H5Eget_num`: number of frames on the calling thread's stack.
    fn error_count(&self) -> isize;

    /// `H5Ewalk2` on the default stack.
    fn walk_error_stack(&self, direction: WalkDirection, visitor: &mut ErrorVisitor<'_>) -> herr_t;

    /// `H5Eclear2` on the default stack.
    fn clear_error_stack(&self) -> herr_t;

    /// `H5Eget_class_name`.
    fn error_class_name(&self, class_id: hid_t) -> Option<String>;

    /// `H5Eget_msg`.
    fn error_message(&self, msg_id: hid_t) -> Option<String>;

    // ── Files and objects (H5F, H5O, H5L, H5G, H5D) ──

    /// `H5Fcreate` with `H5F_ACC_TRUNC`.
    fn create_file(&self, name: &str) -> hid_t;

    /// `H5Fopen`.
    fn open_file(&self, name: &str, writable: bool) -> hid_t;

    /// `H5Oopen`: resolve `path` relative to `loc` (or absolutely).
    fn open_object(&self, loc: hid_t, path: &str) -> hid_t;

    /// `H5Lexists`.
    fn link_exists(&self, loc: hid_t, path: &str) -> htri_t;

    /// `H5Oget_info3` with `H5O_INFO_BASIC`.
    fn object_info(&self, id: hid_t, info: &mut ObjectInfo) -> herr_t;

    /// `H5Gcreate2` with default property lists.
    fn create_group(&self, loc: hid_t, path: &str) -> hid_t;

    /// `H5Dcreate2`. A `chunk` shape selects chunked layout, which an
    /// extendible dataspace requires.
    fn create_dataset(
        &self,
        loc: hid_t,
        path: &str,
        type_id: hid_t,
        space_id: hid_t,
        chunk: Option<&[hsize_t]>,
    ) -> hid_t;

    /// `H5Dget_space`.
    fn dataset_space(&self, id: hid_t) -> hid_t;

    /// `H5Dget_type`.
    fn dataset_type(&self, id: hid_t) -> hid_t;

    /// `H5Dset_extent`.
    fn set_extent(&self, id: hid_t, dims: &[hsize_t]) -> herr_t;

    /// `H5Drefresh`.
    fn refresh_dataset(&self, id: hid_t) -> herr_t;

    // ── Dataspaces (H5S) ──

    /// `H5Screate(H5S_SCALAR)`.
    fn create_scalar_space(&self) -> hid_t;

    /// `H5Screate_simple`.
    fn create_simple_space(&self, current: &[hsize_t], maximum: Option<&[hsize_t]>) -> hid_t;

    /// `H5Sget_simple_extent_type`. `SpaceClass::NoClass` on failure.
    fn space_class(&self, id: hid_t) -> SpaceClass;

    /// `H5Sget_simple_extent_ndims`.
    fn space_rank(&self, id: hid_t) -> c_int;

    /// `H5Sget_simple_extent_dims`: fills both slices up to the rank and
    /// returns the rank.
    fn space_dims(&self, id: hid_t, current: &mut [hsize_t], maximum: &mut [hsize_t]) -> c_int;

    // ── Datatypes (H5T) ──

    /// Identifier of a predefined native type. Library-owned: never close it.
    fn native_type(&self, kind: NativeKind) -> hid_t;

    /// `H5Tcopy`.
    fn copy_type(&self, id: hid_t) -> hid_t;

    /// `H5Tget_size`. Zero on failure.
    fn type_size(&self, id: hid_t) -> usize;

    /// `H5Tequal`.
    fn types_equal(&self, a: hid_t, b: hid_t) -> htri_t;
}
