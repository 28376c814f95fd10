//! Raw scalar types and enumerations of the native API.
//!
//! Mirrors the subset of `H5public.h`, `H5Ipublic.h`, `H5Opublic.h`,
//! `H5Spublic.h` and `H5Epublic.h` the wrapper layer talks to. Values follow
//! the HDF5 1.12 headers.

#![allow(non_camel_case_types)]

use libc::c_int;

/// Native object identifier. Negative means failure.
pub type hid_t = i64;

/// Native status code. Negative means failure.
pub type herr_t = c_int;

/// Native tri-state: positive = true, zero = false, negative = failure.
pub type htri_t = c_int;

/// Native size / dimension type.
pub type hsize_t = u64;

/// Invalid identifier sentinel.
pub const H5I_INVALID_HID: hid_t = -1;

/// Default property list.
pub const H5P_DEFAULT: hid_t = 0;

/// Default (thread-current) error stack.
pub const H5E_DEFAULT: hid_t = 0;

/// Unlimited dimension marker for dataspace maxima.
pub const H5S_UNLIMITED: hsize_t = hsize_t::MAX;

pub const SUCCEED: herr_t = 0;
pub const FAIL: herr_t = -1;

// ── Identifier categories (H5I_type_t) ──

/// Category of a native identifier, as reported by `H5Iget_type`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    BadId = -1,
    File = 1,
    Group = 2,
    Datatype = 3,
    Dataspace = 4,
    Dataset = 5,
    Map = 6,
    Attribute = 7,
    PropertyClass = 10,
    PropertyList = 11,
    ErrorClass = 12,
    ErrorMessage = 13,
    ErrorStack = 14,
}

impl HandleKind {
    pub fn from_raw(v: c_int) -> Self {
        match v {
            1 => HandleKind::File,
            2 => HandleKind::Group,
            3 => HandleKind::Datatype,
            4 => HandleKind::Dataspace,
            5 => HandleKind::Dataset,
            6 => HandleKind::Map,
            7 => HandleKind::Attribute,
            10 => HandleKind::PropertyClass,
            11 => HandleKind::PropertyList,
            12 => HandleKind::ErrorClass,
            13 => HandleKind::ErrorMessage,
            14 => HandleKind::ErrorStack,
            _ => HandleKind::BadId,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HandleKind::BadId => "bad id",
            HandleKind::File => "file",
            HandleKind::Group => "group",
            HandleKind::Datatype => "datatype",
            HandleKind::Dataspace => "dataspace",
            HandleKind::Dataset => "dataset",
            HandleKind::Map => "map",
            HandleKind::Attribute => "attribute",
            HandleKind::PropertyClass => "property class",
            HandleKind::PropertyList => "property list",
            HandleKind::ErrorClass => "error class",
            HandleKind::ErrorMessage => "error message",
            HandleKind::ErrorStack => "error stack",
        }
    }
}

// ── Object categories (H5O_type_t) ──

/// Category of an object inside a file, as reported by `H5Oget_info`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Unknown = -1,
    Group = 0,
    Dataset = 1,
    NamedDatatype = 2,
    Map = 3,
}

impl NodeType {
    pub fn from_raw(v: c_int) -> Self {
        match v {
            0 => NodeType::Group,
            1 => NodeType::Dataset,
            2 => NodeType::NamedDatatype,
            3 => NodeType::Map,
            _ => NodeType::Unknown,
        }
    }
}

impl core::fmt::Display for NodeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            NodeType::Unknown => "unknown",
            NodeType::Group => "group",
            NodeType::Dataset => "dataset",
            NodeType::NamedDatatype => "named datatype",
            NodeType::Map => "map",
        };
        f.write_str(s)
    }
}

// ── Dataspace classes (H5S_class_t) ──

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceClass {
    NoClass = -1,
    Scalar = 0,
    Simple = 1,
    Null = 2,
}

impl SpaceClass {
    pub fn from_raw(v: c_int) -> Self {
        match v {
            0 => SpaceClass::Scalar,
            1 => SpaceClass::Simple,
            2 => SpaceClass::Null,
            _ => SpaceClass::NoClass,
        }
    }
}

// ── Predefined native datatypes ──

/// Predefined native scalar types (`H5T_NATIVE_INT8` .. `H5T_NATIVE_DOUBLE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl NativeKind {
    pub const ALL: [NativeKind; 10] = [
        NativeKind::Int8,
        NativeKind::UInt8,
        NativeKind::Int16,
        NativeKind::UInt16,
        NativeKind::Int32,
        NativeKind::UInt32,
        NativeKind::Int64,
        NativeKind::UInt64,
        NativeKind::Float32,
        NativeKind::Float64,
    ];

    /// Size of one element in bytes.
    pub const fn size(&self) -> usize {
        match self {
            NativeKind::Int8 | NativeKind::UInt8 => 1,
            NativeKind::Int16 | NativeKind::UInt16 => 2,
            NativeKind::Int32 | NativeKind::UInt32 | NativeKind::Float32 => 4,
            NativeKind::Int64 | NativeKind::UInt64 | NativeKind::Float64 => 8,
        }
    }
}

// ── Error stack walking (H5E_direction_t) ──

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDirection {
    /// Innermost frame first, ending at the API function.
    Upward = 0,
    /// API function first, ending at the innermost frame.
    Downward = 1,
}

/// One frame of the native error stack (`H5E_error2_t`), with its C strings
/// copied out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub class_id: hid_t,
    pub major: hid_t,
    pub minor: hid_t,
    pub line: u32,
    pub function: String,
    pub file: String,
    pub description: String,
}

/// Result of an object-info query (`H5O_info2_t`, basic fields only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectInfo {
    pub fileno: u64,
    pub token: [u8; 16],
    pub node_type: NodeType,
    pub ref_count: u32,
}

impl Default for ObjectInfo {
    fn default() -> Self {
        Self {
            fileno: 0,
            token: [0; 16],
            node_type: NodeType::Unknown,
            ref_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_kind_from_raw() {
        assert_eq!(HandleKind::from_raw(5), HandleKind::Dataset);
        assert_eq!(HandleKind::from_raw(11), HandleKind::PropertyList);
        assert_eq!(HandleKind::from_raw(99), HandleKind::BadId);
        assert_eq!(HandleKind::from_raw(-1), HandleKind::BadId);
    }

    #[test]
    fn test_node_type_roundtrip() {
        for t in [NodeType::Group, NodeType::Dataset, NodeType::NamedDatatype] {
            assert_eq!(NodeType::from_raw(t as i32), t);
        }
        assert_eq!(NodeType::from_raw(42), NodeType::Unknown);
    }

    #[test]
    fn test_native_sizes() {
        assert_eq!(NativeKind::UInt8.size(), 1);
        assert_eq!(NativeKind::Int32.size(), 4);
        assert_eq!(NativeKind::Float64.size(), 8);
    }
}
