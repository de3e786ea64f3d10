//! The mongodb crate doesn't provide error code constants, so the ones we
//! care about live here.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// Return true if the given error is a unique index violation.
pub fn is_duplicate_key(err: &DbError) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(ref e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}
