use core::{fmt, mem, ptr::NonNull};
use std::io::{self, Read, Seek, SeekFrom, Write};

use libc::FILE;

use crate::{
    error::{Error, Result},
    sys::{Native, Platform},
};

/// An owned C stdio stream.
///
/// It's closed on drop.
#[repr(transparent)]
#[clippy::has_significant_drop]
pub struct OwnedFile {
    file: NonNull<FILE>,
}

// SAFETY: stdio streams lock internally, and `OwnedFile` is the
// stream's only owner.
unsafe impl Send for OwnedFile {}

impl OwnedFile {
    /// Takes ownership of a stream returned by `fopen`.
    ///
    /// Returns `None` if `file` is null.
    ///
    /// # Safety
    ///
    /// - `file` must be null or an open stream that nothing else
    ///   will close.
    pub unsafe fn from_raw(file: *mut FILE) -> Option<Self> {
        NonNull::new(file).map(|file| Self { file })
    }

    /// Takes ownership of a stream that is known to be open.
    ///
    /// # Safety
    ///
    /// - `file` must be an open stream that nothing else will
    ///   close.
    pub(crate) unsafe fn from_non_null(file: NonNull<FILE>) -> Self {
        Self { file }
    }

    /// Returns the underlying stream without giving up
    /// ownership.
    pub fn as_ptr(&self) -> *mut FILE {
        self.file.as_ptr()
    }

    /// Releases ownership of the stream. The caller becomes
    /// responsible for `fclose`.
    pub fn into_raw(self) -> *mut FILE {
        let file = self.file.as_ptr();
        mem::forget(self);
        file
    }

    /// Closes the stream, reporting any error from `fclose`.
    pub fn close(self) -> Result<()> {
        let file = self.into_raw();
        // SAFETY: `file` is open and we own it.
        let ret = unsafe { libc::fclose(file) };
        if ret != 0 {
            Err(Error::last_os_error())
        } else {
            Ok(())
        }
    }

    fn error(&self) -> bool {
        // SAFETY: FFI call, `self.file` is open.
        unsafe { libc::ferror(self.file.as_ptr()) != 0 }
    }
}

impl Drop for OwnedFile {
    fn drop(&mut self) {
        // SAFETY: `self.file` is open and we own it.
        let _ = unsafe { libc::fclose(self.file.as_ptr()) };
    }
}

impl fmt::Debug for OwnedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedFile").field(&self.file).finish()
    }
}

impl Read for OwnedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: FFI call, `buf` is valid for `buf.len()`
        // bytes.
        let n = unsafe { libc::fread(buf.as_mut_ptr().cast(), 1, buf.len(), self.as_ptr()) };
        if n < buf.len() && self.error() {
            return Err(Error::last_os_error().into());
        }
        Ok(n)
    }
}

impl Write for OwnedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: FFI call, `buf` is valid for `buf.len()`
        // bytes.
        let n = unsafe { libc::fwrite(buf.as_ptr().cast(), 1, buf.len(), self.as_ptr()) };
        if n < buf.len() && self.error() {
            return Err(Error::last_os_error().into());
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        // SAFETY: FFI call, `self.file` is open.
        let ret = unsafe { libc::fflush(self.as_ptr()) };
        if ret != 0 {
            return Err(Error::last_os_error().into());
        }
        Ok(())
    }
}

impl Seek for OwnedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (off, whence) = match pos {
            SeekFrom::Start(off) => (
                i64::try_from(off).map_err(|_| Error::InvalidArgument)?,
                libc::SEEK_SET,
            ),
            SeekFrom::Current(off) => (off, libc::SEEK_CUR),
            SeekFrom::End(off) => (off, libc::SEEK_END),
        };
        Native::seek(self, off, whence)?;
        self.stream_position()
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        let pos = Native::tell(self)?;
        u64::try_from(pos).map_err(|_| io::Error::from(Error::InvalidArgument))
    }
}
