//! `LinkedLibrary`: `NativeApi` over the system `libhdf5`.
//!
//! Only compiled with the `hdf5` feature. Functions, structures and the
//! predefined type globals come from `hdf5-sys`, which links the system
//! library. Requires 1.12 or newer for `H5Oget_info3` and the token-based
//! `H5O_info2_t`.
//!
//! All entry points act on the default (thread-current) error stack, so the
//! per-thread semantics come from the library itself.

use std::ffi::{CStr, CString};
use std::ptr;

use hdf5_sys::h5::H5open;
use hdf5_sys::h5a::H5Aclose;
use hdf5_sys::h5d::{H5Dclose, H5Dcreate2, H5Dget_space, H5Dget_type, H5Drefresh, H5Dset_extent};
use hdf5_sys::h5e::{
    H5E_auto2_t, H5E_direction_t, H5E_error2_t, H5Eclear2, H5Eget_auto2, H5Eget_class_name, H5Eget_msg,
    H5Eget_num, H5Eprint2, H5Eset_auto2, H5Ewalk2, H5E_DEFAULT,
};
use hdf5_sys::h5f::{H5Fclose, H5Fcreate, H5Fopen, H5F_ACC_RDONLY, H5F_ACC_RDWR, H5F_ACC_TRUNC};
use hdf5_sys::h5g::{H5Gclose, H5Gcreate2};
use hdf5_sys::h5i::{H5Idec_ref, H5Iget_ref, H5Iget_type, H5Iinc_ref, H5Iis_valid};
use hdf5_sys::h5l::H5Lexists;
use hdf5_sys::h5o::{H5O_info2_t, H5Oget_info3, H5Oopen, H5O_INFO_BASIC};
use hdf5_sys::h5p::{H5Pclose, H5Pcreate, H5Pset_chunk, H5P_CLS_DATASET_CREATE, H5P_DEFAULT};
use hdf5_sys::h5s::{
    H5S_class_t, H5Sclose, H5Screate, H5Screate_simple, H5Sget_simple_extent_dims, H5Sget_simple_extent_ndims,
    H5Sget_simple_extent_type,
};
use hdf5_sys::h5t::{
    H5Tclose, H5Tcopy, H5Tequal, H5Tget_size, H5T_NATIVE_DOUBLE, H5T_NATIVE_FLOAT, H5T_NATIVE_INT16,
    H5T_NATIVE_INT32, H5T_NATIVE_INT64, H5T_NATIVE_INT8, H5T_NATIVE_UINT16, H5T_NATIVE_UINT32,
    H5T_NATIVE_UINT64, H5T_NATIVE_UINT8,
};
use libc::{c_char, c_int, c_uint, c_void, size_t, ssize_t};

use crate::api::{ErrorVisitor, NativeApi};
use crate::types::{
    herr_t, hid_t, hsize_t, htri_t, ErrorRecord, HandleKind, NativeKind, NodeType, ObjectInfo, SpaceClass,
    WalkDirection, FAIL, H5I_INVALID_HID, SUCCEED,
};

/// Auto-print callback: print the stack to stderr.
unsafe extern "C" fn print_to_stderr(estack: hid_t, _client_data: *mut c_void) -> herr_t {
    H5Eprint2(estack, ptr::null_mut())
}

struct WalkState<'a, 'b> {
    visitor: &'a mut ErrorVisitor<'b>,
}

unsafe extern "C" fn walk_trampoline(n: c_uint, desc: *const H5E_error2_t, client_data: *mut c_void) -> herr_t {
    if desc.is_null() || client_data.is_null() {
        return FAIL;
    }
    let state = &mut *(client_data as *mut WalkState<'_, '_>);
    let desc = &*desc;
    let record = ErrorRecord {
        class_id: desc.cls_id,
        major: desc.maj_num,
        minor: desc.min_num,
        line: desc.line,
        function: owned(desc.func_name),
        file: owned(desc.file_name),
        description: owned(desc.desc),
    };
    (state.visitor)(n, &record)
}

unsafe fn owned(s: *const c_char) -> String {
    if s.is_null() {
        String::new()
    } else {
        CStr::from_ptr(s).to_string_lossy().into_owned()
    }
}

/// Read a string through a size-probing C getter (`len = f(buf, size)`).
fn read_string(mut f: impl FnMut(*mut c_char, size_t) -> ssize_t) -> Option<String> {
    let len = f(ptr::null_mut(), 0);
    if len < 0 {
        return None;
    }
    let mut buf = vec![0u8; len as usize + 1];
    if f(buf.as_mut_ptr().cast(), buf.len()) < 0 {
        return None;
    }
    buf.truncate(len as usize);
    Some(String::from_utf8_lossy(&buf).into_owned())
}

/// Backend forwarding to the linked `libhdf5`.
pub struct LinkedLibrary {
    _private: (),
}

impl LinkedLibrary {
    /// Initialise the library. `None` if `H5open` fails.
    pub fn new() -> Option<Self> {
        if unsafe { H5open() } < 0 {
            return None;
        }
        Some(Self { _private: () })
    }

    /// Rank of the dataset's current dataspace.
    fn dataset_rank(&self, id: hid_t) -> c_int {
        let space = self.dataset_space(id);
        if space < 0 {
            return FAIL;
        }
        let rank = self.space_rank(space);
        unsafe { H5Sclose(space) };
        rank
    }
}

impl NativeApi for LinkedLibrary {
    fn name(&self) -> &str {
        "libhdf5"
    }

    fn is_valid(&self, id: hid_t) -> htri_t {
        unsafe { H5Iis_valid(id) }
    }

    fn identifier_kind(&self, id: hid_t) -> HandleKind {
        HandleKind::from_raw(unsafe { H5Iget_type(id) } as c_int)
    }

    fn inc_ref(&self, id: hid_t) -> c_int {
        unsafe { H5Iinc_ref(id) }
    }

    fn ref_count(&self, id: hid_t) -> c_int {
        unsafe { H5Iget_ref(id) }
    }

    fn close(&self, id: hid_t) -> herr_t {
        unsafe {
            match self.identifier_kind(id) {
                HandleKind::File => H5Fclose(id),
                HandleKind::Group => H5Gclose(id),
                HandleKind::Dataset => H5Dclose(id),
                HandleKind::Datatype => H5Tclose(id),
                HandleKind::Dataspace => H5Sclose(id),
                HandleKind::Attribute => H5Aclose(id),
                HandleKind::PropertyList => H5Pclose(id),
                _ => H5Idec_ref(id).min(SUCCEED),
            }
        }
    }

    fn set_auto_print(&self, enabled: bool) -> herr_t {
        let func: H5E_auto2_t = if enabled { Some(print_to_stderr) } else { None };
        unsafe { H5Eset_auto2(H5E_DEFAULT, func, ptr::null_mut()) }
    }

    fn auto_print(&self) -> htri_t {
        let mut func: H5E_auto2_t = None;
        let mut data: *mut c_void = ptr::null_mut();
        if unsafe { H5Eget_auto2(H5E_DEFAULT, &mut func, &mut data) } < 0 {
            return FAIL;
        }
        c_int::from(func.is_some())
    }

    fn error_count(&self) -> isize {
        unsafe { H5Eget_num(H5E_DEFAULT) }
    }

    fn walk_error_stack(&self, direction: WalkDirection, visitor: &mut ErrorVisitor<'_>) -> herr_t {
        let direction = match direction {
            WalkDirection::Upward => H5E_direction_t::H5E_WALK_UPWARD,
            WalkDirection::Downward => H5E_direction_t::H5E_WALK_DOWNWARD,
        };
        let mut state = WalkState { visitor };
        unsafe {
            H5Ewalk2(
                H5E_DEFAULT,
                direction,
                Some(walk_trampoline),
                (&mut state as *mut WalkState<'_, '_>).cast(),
            )
        }
    }

    fn clear_error_stack(&self) -> herr_t {
        unsafe { H5Eclear2(H5E_DEFAULT) }
    }

    fn error_class_name(&self, class_id: hid_t) -> Option<String> {
        read_string(|buf, size| unsafe { H5Eget_class_name(class_id, buf, size) })
    }

    fn error_message(&self, msg_id: hid_t) -> Option<String> {
        read_string(|buf, size| unsafe { H5Eget_msg(msg_id, ptr::null_mut(), buf, size) })
    }

    fn create_file(&self, name: &str) -> hid_t {
        let Ok(name) = CString::new(name) else {
            return H5I_INVALID_HID;
        };
        unsafe { H5Fcreate(name.as_ptr(), H5F_ACC_TRUNC, H5P_DEFAULT, H5P_DEFAULT) }
    }

    fn open_file(&self, name: &str, writable: bool) -> hid_t {
        let Ok(name) = CString::new(name) else {
            return H5I_INVALID_HID;
        };
        let flags = if writable { H5F_ACC_RDWR } else { H5F_ACC_RDONLY };
        unsafe { H5Fopen(name.as_ptr(), flags, H5P_DEFAULT) }
    }

    fn open_object(&self, loc: hid_t, path: &str) -> hid_t {
        let Ok(path) = CString::new(path) else {
            return H5I_INVALID_HID;
        };
        unsafe { H5Oopen(loc, path.as_ptr(), H5P_DEFAULT) }
    }

    fn link_exists(&self, loc: hid_t, path: &str) -> htri_t {
        let Ok(path) = CString::new(path) else {
            return FAIL;
        };
        unsafe { H5Lexists(loc, path.as_ptr(), H5P_DEFAULT) }
    }

    fn object_info(&self, id: hid_t, info: &mut ObjectInfo) -> herr_t {
        let mut raw = std::mem::MaybeUninit::<H5O_info2_t>::zeroed();
        let ret = unsafe { H5Oget_info3(id, raw.as_mut_ptr(), H5O_INFO_BASIC) };
        if ret < 0 {
            return ret;
        }
        let raw = unsafe { raw.assume_init() };
        *info = ObjectInfo {
            fileno: raw.fileno as u64,
            token: raw.token.__data,
            node_type: NodeType::from_raw(raw.type_ as c_int),
            ref_count: raw.rc,
        };
        ret
    }

    fn create_group(&self, loc: hid_t, path: &str) -> hid_t {
        let Ok(path) = CString::new(path) else {
            return H5I_INVALID_HID;
        };
        unsafe { H5Gcreate2(loc, path.as_ptr(), H5P_DEFAULT, H5P_DEFAULT, H5P_DEFAULT) }
    }

    fn create_dataset(
        &self,
        loc: hid_t,
        path: &str,
        type_id: hid_t,
        space_id: hid_t,
        chunk: Option<&[hsize_t]>,
    ) -> hid_t {
        let Ok(path) = CString::new(path) else {
            return H5I_INVALID_HID;
        };
        unsafe {
            let dcpl = match chunk {
                Some(dims) => {
                    let dcpl = H5Pcreate(*H5P_CLS_DATASET_CREATE);
                    if dcpl < 0 {
                        return H5I_INVALID_HID;
                    }
                    if H5Pset_chunk(dcpl, dims.len() as c_int, dims.as_ptr()) < 0 {
                        H5Pclose(dcpl);
                        return H5I_INVALID_HID;
                    }
                    dcpl
                }
                None => H5P_DEFAULT,
            };
            let id = H5Dcreate2(loc, path.as_ptr(), type_id, space_id, H5P_DEFAULT, dcpl, H5P_DEFAULT);
            if dcpl != H5P_DEFAULT {
                H5Pclose(dcpl);
            }
            id
        }
    }

    fn dataset_space(&self, id: hid_t) -> hid_t {
        unsafe { H5Dget_space(id) }
    }

    fn dataset_type(&self, id: hid_t) -> hid_t {
        unsafe { H5Dget_type(id) }
    }

    fn set_extent(&self, id: hid_t, dims: &[hsize_t]) -> herr_t {
        // H5Dset_extent reads `rank` values from the pointer.
        let rank = self.dataset_rank(id);
        if rank < 0 || dims.len() != rank as usize {
            return FAIL;
        }
        unsafe { H5Dset_extent(id, dims.as_ptr()) }
    }

    fn refresh_dataset(&self, id: hid_t) -> herr_t {
        unsafe { H5Drefresh(id) }
    }

    fn create_scalar_space(&self) -> hid_t {
        unsafe { H5Screate(H5S_class_t::H5S_SCALAR) }
    }

    fn create_simple_space(&self, current: &[hsize_t], maximum: Option<&[hsize_t]>) -> hid_t {
        if maximum.is_some_and(|m| m.len() != current.len()) {
            return H5I_INVALID_HID;
        }
        let max = maximum.map_or(ptr::null(), <[hsize_t]>::as_ptr);
        unsafe { H5Screate_simple(current.len() as c_int, current.as_ptr(), max) }
    }

    fn space_class(&self, id: hid_t) -> SpaceClass {
        SpaceClass::from_raw(unsafe { H5Sget_simple_extent_type(id) } as c_int)
    }

    fn space_rank(&self, id: hid_t) -> c_int {
        unsafe { H5Sget_simple_extent_ndims(id) }
    }

    fn space_dims(&self, id: hid_t, current: &mut [hsize_t], maximum: &mut [hsize_t]) -> c_int {
        let rank = self.space_rank(id);
        if rank < 0 || current.len() < rank as usize || maximum.len() < rank as usize {
            return FAIL;
        }
        unsafe { H5Sget_simple_extent_dims(id, current.as_mut_ptr(), maximum.as_mut_ptr()) }
    }

    fn native_type(&self, kind: NativeKind) -> hid_t {
        match kind {
            NativeKind::Int8 => *H5T_NATIVE_INT8,
            NativeKind::UInt8 => *H5T_NATIVE_UINT8,
            NativeKind::Int16 => *H5T_NATIVE_INT16,
            NativeKind::UInt16 => *H5T_NATIVE_UINT16,
            NativeKind::Int32 => *H5T_NATIVE_INT32,
            NativeKind::UInt32 => *H5T_NATIVE_UINT32,
            NativeKind::Int64 => *H5T_NATIVE_INT64,
            NativeKind::UInt64 => *H5T_NATIVE_UINT64,
            NativeKind::Float32 => *H5T_NATIVE_FLOAT,
            NativeKind::Float64 => *H5T_NATIVE_DOUBLE,
        }
    }

    fn copy_type(&self, id: hid_t) -> hid_t {
        unsafe { H5Tcopy(id) }
    }

    fn type_size(&self, id: hid_t) -> usize {
        unsafe { H5Tget_size(id) }
    }

    fn types_equal(&self, a: hid_t, b: hid_t) -> htri_t {
        unsafe { H5Tequal(a, b) }
    }
}
