//! The C ABI.
//!
//! These functions keep the CRT's calling convention: failure is
//! a sentinel return (`-1`, null or `0`) and the reason is left
//! in `errno`. With the `capi` feature they are exported under
//! their CRT names on non-Windows targets, where the real CRT
//! does not provide them.
//!
//! Null required arguments are rejected with `EINVAL` before
//! anything is dereferenced.

use core::{
    ffi::{c_char, c_int, c_uint, c_ulong, CStr},
    ptr, slice,
};

use libc::{wchar_t, FILE};
use tracing::debug;
use widestring::{WideCStr, WideChar};

use crate::{
    api,
    buf::{WideBuf, WideOut},
    conv,
    error::{Error, Result},
    locale, CP_UTF8,
};

/// Borrows a required wide-string argument.
///
/// # Safety
///
/// - `ptr` must be null or point to a null-terminated wide
///   string that is valid and unmodified for `'a`.
unsafe fn wide_arg<'a>(ptr: *const wchar_t) -> Result<&'a WideCStr> {
    if ptr.is_null() {
        return Err(Error::InvalidArgument);
    }
    // SAFETY: See the function's safety docs.
    Ok(unsafe { WideCStr::from_ptr_str(ptr.cast::<WideChar>()) })
}

/// Reports `err` through `errno` and returns the sentinel.
fn fail<T>(op: &'static str, err: Error, sentinel: T) -> T {
    debug!(op, %err, errno = err.errno().code(), "call failed");
    err.set_errno();
    sentinel
}

/// Copies `s` into a `malloc`ed buffer the C caller releases
/// with `free`.
fn malloc_wide(s: &WideCStr) -> Result<*mut wchar_t> {
    let src = s.as_slice_with_nul();
    let size = src
        .len()
        .checked_mul(size_of::<wchar_t>())
        .ok_or(Error::OutOfMemory)?;
    // SAFETY: FFI call, no invariants.
    let dst = unsafe { libc::malloc(size) }.cast::<WideChar>();
    if dst.is_null() {
        return Err(Error::OutOfMemory);
    }
    // SAFETY: `dst` was just allocated with room for
    // `src.len()` units and cannot overlap `src`.
    unsafe { ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len()) };
    Ok(dst.cast())
}

/// Changes the working directory.
///
/// Returns 0 on success, or -1 with `errno` set.
///
/// # Safety
///
/// - `path` must be null or a valid null-terminated wide
///   string.
#[cfg_attr(all(feature = "capi", not(windows)), unsafe(no_mangle))]
pub unsafe extern "C" fn wchdir_compat(path: *const wchar_t) -> c_int {
    // SAFETY: See the function's safety docs.
    let res = unsafe { wide_arg(path) }.and_then(api::change_directory);
    match res {
        Ok(()) => 0,
        Err(err) => fail("wchdir", err, -1),
    }
}

/// Returns the working directory.
///
/// If `buffer` is null or `size` is zero, the result is written
/// to a new `malloc`ed buffer that the caller must `free`.
/// Otherwise it is written to `buffer`, which holds `size` wide
/// characters; if it does not fit, `ERANGE` is reported and
/// `buffer` is left untouched.
///
/// Returns null with `errno` set on failure.
///
/// # Safety
///
/// - If `buffer` is non-null it must be valid for writes of
///   `size` wide characters.
#[cfg_attr(all(feature = "capi", not(windows)), unsafe(no_mangle))]
pub unsafe extern "C" fn wgetcwd_compat(buffer: *mut wchar_t, size: usize) -> *mut wchar_t {
    let dst = if buffer.is_null() || size == 0 {
        WideBuf::Allocate
    } else {
        // SAFETY: See the function's safety docs.
        WideBuf::Caller(unsafe { slice::from_raw_parts_mut(buffer.cast::<WideChar>(), size) })
    };
    let res = api::current_directory(dst).and_then(|out| match out {
        WideOut::Written(_) => Ok(buffer),
        WideOut::Allocated(s) => malloc_wide(&s),
    });
    match res {
        Ok(ptr) => ptr,
        Err(err) => fail("wgetcwd", err, ptr::null_mut()),
    }
}

/// Stores the path of the running executable in `*ptr`.
///
/// The string is owned by the library and lives for the rest
/// of the process; the caller must not modify or free it.
///
/// Returns 0 on success, or -1 with `errno` set.
///
/// # Safety
///
/// - `ptr` must be null or valid for writes.
#[cfg_attr(all(feature = "capi", not(windows)), unsafe(no_mangle))]
pub unsafe extern "C" fn get_pgmptr_compat(ptr: *mut *mut c_char) -> c_int {
    if ptr.is_null() {
        return fail("get_pgmptr", Error::InvalidArgument, -1);
    }
    match api::program_path() {
        Ok(path) => {
            // SAFETY: `ptr` is non-null and, per the function's
            // safety docs, valid for writes.
            unsafe { ptr.write(path.as_ptr().cast_mut()) };
            0
        }
        Err(err) => fail("get_pgmptr", err, -1),
    }
}

/// Resolves `src` to an absolute, symlink-free path and writes
/// it to `dst`, which holds `size` wide characters.
///
/// Returns `dst`, or null with `errno` set. If the resolved path
/// does not fit, `ERANGE` is reported and `dst` is left
/// untouched.
///
/// # Safety
///
/// - `src` must be null or a valid null-terminated wide
///   string.
/// - If `dst` is non-null it must be valid for writes of `size`
///   wide characters and must not overlap `src`.
#[cfg_attr(all(feature = "capi", not(windows)), unsafe(no_mangle))]
pub unsafe extern "C" fn wfullpath_compat(
    dst: *mut wchar_t,
    src: *const wchar_t,
    size: usize,
) -> *mut wchar_t {
    if dst.is_null() || size == 0 {
        return fail("wfullpath", Error::InvalidArgument, ptr::null_mut());
    }
    let res = (|| {
        // SAFETY: See the function's safety docs.
        let src = unsafe { wide_arg(src) }?;
        // SAFETY: See the function's safety docs.
        let buf = unsafe { slice::from_raw_parts_mut(dst.cast::<WideChar>(), size) };
        api::full_path(src, WideBuf::Caller(buf)).map(|_| dst)
    })();
    match res {
        Ok(ptr) => ptr,
        Err(err) => fail("wfullpath", err, ptr::null_mut()),
    }
}

/// Converts a multibyte (UTF-8) string to a wide string.
///
/// `cp` and `flags` are accepted for source compatibility and
/// otherwise ignored. If `srclen` is -1, `src` is null
/// terminated; otherwise `srclen` bytes are read, stopping at
/// the first null byte. A `srclen` of 0 is rejected with
/// `EINVAL`, as on Windows.
///
/// Returns the number of wide characters written to `dst`, not
/// counting the null terminator that is always written. Returns
/// 0 with `errno` set if an argument is invalid (`EINVAL`), the
/// input is not valid UTF-8 (`EILSEQ`) or the result plus its
/// terminator does not fit in `dstlen` characters (`ERANGE`).
///
/// # Safety
///
/// - `src` must be null, or valid for reads of `srclen` bytes,
///   or null terminated if `srclen` is -1.
/// - `dst` must be null or valid for writes of `dstlen` wide
///   characters.
#[allow(non_snake_case)]
#[cfg_attr(all(feature = "capi", not(windows)), unsafe(no_mangle))]
pub unsafe extern "C" fn MultiByteToWideChar_compat(
    cp: c_uint,
    flags: c_ulong,
    src: *const c_char,
    srclen: c_int,
    dst: *mut wchar_t,
    dstlen: c_int,
) -> c_int {
    locale::init();

    if cp != CP_UTF8 {
        debug!(cp, flags, "treating code page as UTF-8");
    }
    let (Ok(dstlen), false, false) = (usize::try_from(dstlen), src.is_null(), dst.is_null())
    else {
        return fail("MultiByteToWideChar", Error::InvalidArgument, 0);
    };
    let src = match srclen {
        // SAFETY: See the function's safety docs.
        -1 => unsafe { CStr::from_ptr(src) }.to_bytes(),
        n => match usize::try_from(n) {
            // SAFETY: See the function's safety docs.
            Ok(n) if n > 0 => unsafe { slice::from_raw_parts(src.cast::<u8>(), n) },
            _ => return fail("MultiByteToWideChar", Error::InvalidArgument, 0),
        },
    };
    // SAFETY: See the function's safety docs.
    let dst = unsafe { slice::from_raw_parts_mut(dst.cast::<WideChar>(), dstlen) };

    let res = conv::multibyte_to_wide(src, dst)
        .and_then(|n| c_int::try_from(n).map_err(|_| Error::RangeTooSmall));
    match res {
        Ok(n) => n,
        Err(err) => fail("MultiByteToWideChar", err, 0),
    }
}

/// Opens a file.
///
/// Returns the stream, or null with `errno` set.
///
/// # Safety
///
/// - `filename` and `mode` must each be null or a valid
///   null-terminated wide string.
#[cfg_attr(all(feature = "capi", not(windows)), unsafe(no_mangle))]
pub unsafe extern "C" fn _wfopen(filename: *const wchar_t, mode: *const wchar_t) -> *mut FILE {
    let res = (|| {
        // SAFETY: See the function's safety docs.
        let filename = unsafe { wide_arg(filename) }?;
        // SAFETY: See the function's safety docs.
        let mode = unsafe { wide_arg(mode) }?;
        api::open_file(filename, mode)
    })();
    match res {
        Ok(file) => file.into_raw(),
        Err(err) => fail("wfopen", err, ptr::null_mut()),
    }
}

/// Removes a file.
///
/// Returns 0 on success, or -1 with `errno` set.
///
/// # Safety
///
/// - `filename` must be null or a valid null-terminated wide
///   string.
#[cfg_attr(all(feature = "capi", not(windows)), unsafe(no_mangle))]
pub unsafe extern "C" fn _wremove(filename: *const wchar_t) -> c_int {
    // SAFETY: See the function's safety docs.
    let res = unsafe { wide_arg(filename) }.and_then(api::remove_file);
    match res {
        Ok(()) => 0,
        Err(err) => fail("wremove", err, -1),
    }
}

/// Renames a file.
///
/// Returns 0 on success, or -1 with `errno` set.
///
/// # Safety
///
/// - `oldname` and `newname` must each be null or a valid
///   null-terminated wide string.
#[cfg_attr(all(feature = "capi", not(windows)), unsafe(no_mangle))]
pub unsafe extern "C" fn _wrename(oldname: *const wchar_t, newname: *const wchar_t) -> c_int {
    let res = (|| {
        // SAFETY: See the function's safety docs.
        let old = unsafe { wide_arg(oldname) }?;
        // SAFETY: See the function's safety docs.
        let new = unsafe { wide_arg(newname) }?;
        api::rename_file(old, new)
    })();
    match res {
        Ok(()) => 0,
        Err(err) => fail("wrename", err, -1),
    }
}
