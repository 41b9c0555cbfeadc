#![cfg(windows)]

//! The native backend: the CRT already speaks `wchar_t`, so
//! nothing is converted.

use core::{
    ffi::{c_char, c_int, CStr},
    ptr::{self, NonNull},
};
use std::ffi::CString;

use libc::{wchar_t, FILE};
use widestring::WideCStr;

use super::Platform;
use crate::{
    buf::{self, WideBuf, WideOut},
    errno::{errno, Errno},
    error::{Error, Result},
    file::OwnedFile,
};

unsafe extern "C" {
    fn _errno() -> *mut c_int;
    fn _wchdir(dirname: *const wchar_t) -> c_int;
    fn _wgetcwd(buffer: *mut wchar_t, maxlen: c_int) -> *mut wchar_t;
    fn _wfullpath(abs_path: *mut wchar_t, rel_path: *const wchar_t, maxlen: usize)
    -> *mut wchar_t;
    fn _get_pgmptr(value: *mut *mut c_char) -> c_int;
    fn _wfopen(filename: *const wchar_t, mode: *const wchar_t) -> *mut FILE;
    fn _wremove(path: *const wchar_t) -> c_int;
    fn _wrename(old: *const wchar_t, new: *const wchar_t) -> c_int;
    fn _fseeki64(stream: *mut FILE, offset: i64, origin: c_int) -> c_int;
    fn _ftelli64(stream: *mut FILE) -> i64;
}

/// Extended-length paths are at most 32 767 `WCHAR`s.
const PATH_BUF_LEN: usize = 32_768;

/// Returns the CRT's `errno`.
pub(crate) fn crt_errno() -> c_int {
    // SAFETY: `_errno` returns a valid thread-local pointer.
    unsafe { *_errno() }
}

/// Sets the CRT's `errno`.
pub(crate) fn set_crt_errno(code: c_int) {
    // SAFETY: `_errno` returns a valid thread-local pointer.
    unsafe { *_errno() = code }
}

/// The Windows backend.
#[derive(Copy, Clone, Debug, Default)]
pub struct Windows;

impl Platform for Windows {
    fn chdir(path: &WideCStr) -> Result<()> {
        // SAFETY: FFI call, `path` is null terminated.
        let ret = unsafe { _wchdir(path.as_ptr()) };
        if ret < 0 {
            Err(errno().into())
        } else {
            Ok(())
        }
    }

    fn getcwd(dst: WideBuf<'_>) -> Result<WideOut<'_>> {
        let mut tmp = vec![0; PATH_BUF_LEN];
        let len = c_int::try_from(tmp.len()).map_err(|_| Error::RangeTooSmall)?;
        // SAFETY: FFI call, `tmp` is valid for `len` units.
        let ret = unsafe { _wgetcwd(tmp.as_mut_ptr(), len) };
        if ret.is_null() {
            return Err(errno().into());
        }
        let cwd = WideCStr::from_slice_truncate(&tmp).map_err(|_| Error::RangeTooSmall)?;
        buf::copy_wide(cwd, dst)
    }

    fn realpath<'a>(src: &WideCStr, dst: WideBuf<'a>) -> Result<WideOut<'a>> {
        let mut tmp = vec![0; PATH_BUF_LEN];
        // SAFETY: FFI call, `src` is null terminated and `tmp`
        // is valid for `tmp.len()` units.
        let ret = unsafe { _wfullpath(tmp.as_mut_ptr(), src.as_ptr(), tmp.len()) };
        if ret.is_null() {
            return Err(errno().into());
        }
        let full = WideCStr::from_slice_truncate(&tmp).map_err(|_| Error::RangeTooSmall)?;
        buf::copy_wide(full, dst)
    }

    fn program_path() -> Result<CString> {
        let mut ptr = ptr::null_mut();
        // SAFETY: FFI call, `ptr` is a valid out-parameter.
        let ret = unsafe { _get_pgmptr(&mut ptr) };
        if ret != 0 || ptr.is_null() {
            return Err(Errno::from_raw_os_error(ret).into());
        }
        // SAFETY: `_get_pgmptr` returns a null-terminated
        // string owned by the CRT.
        Ok(unsafe { CStr::from_ptr(ptr) }.to_owned())
    }

    fn fopen(filename: &WideCStr, mode: &WideCStr) -> Result<OwnedFile> {
        // SAFETY: FFI call, both arguments are null terminated.
        let file = unsafe { _wfopen(filename.as_ptr(), mode.as_ptr()) };
        let file = NonNull::new(file).ok_or_else(errno)?;
        // SAFETY: `file` was just opened and nothing else owns
        // it.
        Ok(unsafe { OwnedFile::from_non_null(file) })
    }

    fn remove(filename: &WideCStr) -> Result<()> {
        // SAFETY: FFI call, `filename` is null terminated.
        let ret = unsafe { _wremove(filename.as_ptr()) };
        if ret < 0 {
            Err(errno().into())
        } else {
            Ok(())
        }
    }

    fn rename(old: &WideCStr, new: &WideCStr) -> Result<()> {
        // SAFETY: FFI call, both arguments are null terminated.
        let ret = unsafe { _wrename(old.as_ptr(), new.as_ptr()) };
        if ret < 0 {
            Err(errno().into())
        } else {
            Ok(())
        }
    }

    fn seek(file: &OwnedFile, off: i64, whence: c_int) -> Result<()> {
        // SAFETY: FFI call, `file` is open.
        let ret = unsafe { _fseeki64(file.as_ptr(), off, whence) };
        if ret < 0 {
            Err(errno().into())
        } else {
            Ok(())
        }
    }

    fn tell(file: &OwnedFile) -> Result<i64> {
        // SAFETY: FFI call, `file` is open.
        let ret = unsafe { _ftelli64(file.as_ptr()) };
        if ret < 0 {
            Err(errno().into())
        } else {
            Ok(ret)
        }
    }
}
