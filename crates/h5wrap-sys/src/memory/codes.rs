//! Error class and message identifiers used by `MemoryLibrary`.
//!
//! # Id ranges
//!
//! | Range        | Purpose                    |
//! |--------------|----------------------------|
//! | `1`          | error class ("HDF5")       |
//! | `100 - 199`  | major messages             |
//! | `200 - 299`  | minor messages             |
//!
//! Object identifiers start far above these (see `registry::FIRST_ID`) so an
//! error id can never be mistaken for a live object.

use crate::types::hid_t;

pub const ERR_CLASS: hid_t = 1;
pub const ERR_CLASS_NAME: &str = "HDF5";

// ── Major (100–199) ──

pub const MAJ_ARGS: hid_t = 101;
pub const MAJ_FILE: hid_t = 102;
pub const MAJ_SYM: hid_t = 103;
pub const MAJ_OHDR: hid_t = 104;
pub const MAJ_DATASET: hid_t = 105;
pub const MAJ_DATASPACE: hid_t = 106;
pub const MAJ_DATATYPE: hid_t = 107;
pub const MAJ_ID: hid_t = 108;
pub const MAJ_LINK: hid_t = 109;

// ── Minor (200–299) ──

pub const MIN_BADID: hid_t = 201;
pub const MIN_BADTYPE: hid_t = 202;
pub const MIN_BADVALUE: hid_t = 203;
pub const MIN_BADRANGE: hid_t = 204;
pub const MIN_NOTFOUND: hid_t = 205;
pub const MIN_EXISTS: hid_t = 206;
pub const MIN_CANTOPENOBJ: hid_t = 207;
pub const MIN_CANTOPENFILE: hid_t = 208;
pub const MIN_CANTCREATE: hid_t = 209;
pub const MIN_CANTINIT: hid_t = 210;
pub const MIN_CANTCLOSEOBJ: hid_t = 211;
pub const MIN_CANTDEC: hid_t = 212;
pub const MIN_CANTINC: hid_t = 213;
pub const MIN_CANTGET: hid_t = 214;
pub const MIN_CANTSET: hid_t = 215;
pub const MIN_CANTCOPY: hid_t = 216;
pub const MIN_CANTCOMPARE: hid_t = 217;
pub const MIN_WRITEERROR: hid_t = 218;

const MESSAGES: &[(hid_t, &str)] = &[
    (MAJ_ARGS, "Invalid arguments to routine"),
    (MAJ_FILE, "File accessibility"),
    (MAJ_SYM, "Symbol table"),
    (MAJ_OHDR, "Object header"),
    (MAJ_DATASET, "Dataset"),
    (MAJ_DATASPACE, "Dataspace"),
    (MAJ_DATATYPE, "Datatype"),
    (MAJ_ID, "Object ID"),
    (MAJ_LINK, "Links"),
    (MIN_BADID, "Unable to find ID information (already closed?)"),
    (MIN_BADTYPE, "Inappropriate type"),
    (MIN_BADVALUE, "Bad value"),
    (MIN_BADRANGE, "Out of range"),
    (MIN_NOTFOUND, "Object not found"),
    (MIN_EXISTS, "Object already exists"),
    (MIN_CANTOPENOBJ, "Can't open object"),
    (MIN_CANTOPENFILE, "Unable to open file"),
    (MIN_CANTCREATE, "Unable to create file"),
    (MIN_CANTINIT, "Unable to initialize object"),
    (MIN_CANTCLOSEOBJ, "Can't close object"),
    (MIN_CANTDEC, "Unable to decrement reference count"),
    (MIN_CANTINC, "Unable to increment reference count"),
    (MIN_CANTGET, "Can't get value"),
    (MIN_CANTSET, "Can't set value"),
    (MIN_CANTCOPY, "Unable to copy object"),
    (MIN_CANTCOMPARE, "Can't compare objects"),
    (MIN_WRITEERROR, "Write failed"),
];

/// Message text for a major or minor id.
pub fn message(id: hid_t) -> Option<&'static str> {
    MESSAGES.iter().find(|(code, _)| *code == id).map(|(_, text)| *text)
}
