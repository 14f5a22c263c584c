//! FFI Bridge - C-ABI Types Shared with the Model Engines
//!
//! The segmenter, tagger, recognizer, parsers and SRL bundle are native
//! libraries exposing a C interface. This module holds the status codes,
//! function-pointer signatures and string marshaling used to talk to them.
//!
//! # Conventions:
//! - Creation functions return an opaque pointer, null on failure
//! - Release functions take that pointer back and return a status code
//! - Locators travel as NUL-terminated C strings

use std::ffi::{c_void, CString};
use std::os::raw::{c_char, c_int};
use std::path::Path;

use crate::error::EngineFailure;

/// C-compatible result code
pub type FfiResult = c_int;

pub const FFI_SUCCESS: FfiResult = 0;
pub const FFI_ERROR: FfiResult = -1;

/// `void* xxx_create_xxx(const char* model_file)`
pub type CreateFn = unsafe extern "C" fn(model: *const c_char) -> *mut c_void;

/// `void* xxx_create_xxx(const char* model_file, const char* lexicon)`
///
/// `lexicon` is null when the caller supplied no lexicon.
pub type CreateWithLexiconFn =
    unsafe extern "C" fn(model: *const c_char, lexicon: *const c_char) -> *mut c_void;

/// `int xxx_release_xxx(void* handle)`
pub type ReleaseFn = unsafe extern "C" fn(handle: *mut c_void) -> FfiResult;

/// `int SRL_LoadResource(const char* data_folder)`
pub type GlobalLoadFn = unsafe extern "C" fn(data_folder: *const c_char) -> FfiResult;

/// `int SRL_ReleaseResource()`
pub type GlobalReleaseFn = unsafe extern "C" fn() -> FfiResult;

/// Convert a filesystem locator into a C string for an engine call.
///
/// On Unix the path bytes are passed through unchanged.
#[cfg(unix)]
pub fn path_to_cstring(path: &Path) -> Result<CString, EngineFailure> {
    use std::os::unix::ffi::OsStrExt;

    Ok(CString::new(path.as_os_str().as_bytes())?)
}

/// Convert a filesystem locator into a C string for an engine call.
///
/// Engines take narrow strings, so the path must be valid UTF-8.
#[cfg(not(unix))]
pub fn path_to_cstring(path: &Path) -> Result<CString, EngineFailure> {
    let text = path
        .to_str()
        .ok_or_else(|| EngineFailure::NonUtf8Locator(path.to_path_buf()))?;
    Ok(CString::new(text)?)
}

/// Map a C status code onto a Rust result.
pub fn check_status(code: FfiResult) -> Result<(), EngineFailure> {
    if code == FFI_SUCCESS {
        Ok(())
    } else {
        Err(EngineFailure::Status(code))
    }
}

/// Collapse any result into the C convention: `FFI_SUCCESS` or `FFI_ERROR`.
pub fn status_of<T, E>(result: &Result<T, E>) -> FfiResult {
    match result {
        Ok(_) => FFI_SUCCESS,
        Err(_) => FFI_ERROR,
    }
}
