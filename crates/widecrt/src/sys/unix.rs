#![cfg(target_family = "unix")]

use core::{
    ffi::{c_int, CStr},
    ptr::NonNull,
};
use std::ffi::CString;

use tracing::trace;
use widestring::WideCStr;

use super::{os, Platform};
use crate::{
    buf::{WideBuf, WideOut},
    conv,
    errno::{errno, Errno},
    error::Result,
    file::OwnedFile,
};

/// The POSIX backend.
///
/// Wide arguments are encoded with [`conv::to_multibyte`],
/// handed to the byte-string libc primitive, and wide results
/// are decoded with [`conv::to_wide`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Posix;

impl Platform for Posix {
    fn chdir(path: &WideCStr) -> Result<()> {
        let path = conv::to_multibyte(path)?;
        trace!(?path, "chdir");
        chdir(&path)?;
        Ok(())
    }

    fn getcwd(dst: WideBuf<'_>) -> Result<WideOut<'_>> {
        let cwd = getcwd()?;
        conv::to_wide(cwd.to_bytes(), dst)
    }

    fn realpath<'a>(src: &WideCStr, dst: WideBuf<'a>) -> Result<WideOut<'a>> {
        let src = conv::to_multibyte(src)?;
        let resolved = realpath(&src)?;
        drop(src);
        trace!(?resolved, "realpath");
        conv::to_wide(resolved.to_bytes(), dst)
    }

    fn program_path() -> Result<CString> {
        Ok(os::program_path()?)
    }

    fn fopen(filename: &WideCStr, mode: &WideCStr) -> Result<OwnedFile> {
        let filename = conv::to_multibyte(filename)?;
        let mode = conv::to_multibyte(mode)?;
        trace!(?filename, ?mode, "fopen");
        let file = fopen(&filename, &mode)?;
        // SAFETY: `file` was just opened and nothing else owns
        // it.
        Ok(unsafe { OwnedFile::from_non_null(file) })
    }

    fn remove(filename: &WideCStr) -> Result<()> {
        let filename = conv::to_multibyte(filename)?;
        trace!(?filename, "remove");
        remove(&filename)?;
        Ok(())
    }

    fn rename(old: &WideCStr, new: &WideCStr) -> Result<()> {
        // If encoding `new` fails, `old` is dropped on the way
        // out.
        let old = conv::to_multibyte(old)?;
        let new = conv::to_multibyte(new)?;
        trace!(?old, ?new, "rename");
        rename(&old, &new)?;
        Ok(())
    }

    fn seek(file: &OwnedFile, off: i64, whence: c_int) -> Result<()> {
        let off = libc::off_t::try_from(off).map_err(|_| Errno::EINVAL)?;
        // SAFETY: FFI call, `file` is open.
        let ret = unsafe { libc::fseeko(file.as_ptr(), off, whence) };
        if ret < 0 {
            Err(errno().into())
        } else {
            Ok(())
        }
    }

    fn tell(file: &OwnedFile) -> Result<i64> {
        // SAFETY: FFI call, `file` is open.
        let ret = unsafe { libc::ftello(file.as_ptr()) };
        if ret < 0 {
            Err(errno().into())
        } else {
            Ok(i64::from(ret))
        }
    }
}

/// The size of the buffer handed to `realpath(3)`.
const PATH_MAX: usize = crate::MAX_PATH;

/// See `chdir(2)`.
pub fn chdir(path: &CStr) -> Result<(), Errno> {
    // SAFETY: FFI call, `path` is null terminated.
    let ret = unsafe { libc::chdir(path.as_ptr()) };
    if ret < 0 {
        Err(errno())
    } else {
        Ok(())
    }
}

/// See `getcwd(3)`.
///
/// The buffer grows until the working directory fits.
pub fn getcwd() -> Result<CString, Errno> {
    let mut buf = vec![0u8; PATH_MAX];
    loop {
        // SAFETY: FFI call, `buf` is valid for `buf.len()`
        // bytes.
        let ret = unsafe { libc::getcwd(buf.as_mut_ptr().cast(), buf.len()) };
        if !ret.is_null() {
            return from_buf(&buf);
        }
        let err = errno();
        if err != Errno::ERANGE {
            return Err(err);
        }
        let len = buf.len().checked_mul(2).ok_or(Errno::ENOMEM)?;
        buf.resize(len, 0);
    }
}

/// See `realpath(3)`.
pub fn realpath(path: &CStr) -> Result<CString, Errno> {
    let mut buf = vec![0u8; PATH_MAX];
    // SAFETY: FFI call, `path` is null terminated and `buf` is
    // `PATH_MAX` bytes long.
    let ret = unsafe { libc::realpath(path.as_ptr(), buf.as_mut_ptr().cast()) };
    if ret.is_null() {
        Err(errno())
    } else {
        from_buf(&buf)
    }
}

/// See `fopen(3)`.
pub fn fopen(path: &CStr, mode: &CStr) -> Result<NonNull<libc::FILE>, Errno> {
    // SAFETY: FFI call, both arguments are null terminated.
    let file = unsafe { libc::fopen(path.as_ptr(), mode.as_ptr()) };
    NonNull::new(file).ok_or_else(errno)
}

/// See `remove(3)`.
pub fn remove(path: &CStr) -> Result<(), Errno> {
    // SAFETY: FFI call, `path` is null terminated.
    let ret = unsafe { libc::remove(path.as_ptr()) };
    if ret < 0 {
        Err(errno())
    } else {
        Ok(())
    }
}

/// See `rename(2)`.
pub fn rename(old: &CStr, new: &CStr) -> Result<(), Errno> {
    // SAFETY: FFI call, both arguments are null terminated.
    let ret = unsafe { libc::rename(old.as_ptr(), new.as_ptr()) };
    if ret < 0 {
        Err(errno())
    } else {
        Ok(())
    }
}

/// Copies the null-terminated prefix of `buf`.
pub(super) fn from_buf(buf: &[u8]) -> Result<CString, Errno> {
    CStr::from_bytes_until_nul(buf)
        .map(CStr::to_owned)
        .map_err(|_| Errno::ERANGE)
}
