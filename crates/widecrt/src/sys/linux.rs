#![cfg(any(target_os = "linux", target_os = "android"))]

use std::ffi::CString;

use super::unix::from_buf;
use crate::errno::{errno, Errno};

/// Resolves the running executable through `/proc/self/exe`.
pub(super) fn program_path() -> Result<CString, Errno> {
    let mut buf = vec![0u8; crate::MAX_PATH];
    // Leave room for the null terminator; `readlink` does not
    // write one.
    let cap = buf.len().saturating_sub(1);
    // SAFETY: FFI call, `buf` is valid for `cap` bytes.
    let ret = unsafe { libc::readlink(c"/proc/self/exe".as_ptr(), buf.as_mut_ptr().cast(), cap) };
    let len = usize::try_from(ret).map_err(|_| errno())?;
    if len >= cap {
        // Possibly truncated.
        return Err(Errno::ERANGE);
    }
    from_buf(&buf)
}
