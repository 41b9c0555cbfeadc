#![cfg(any(target_os = "macos", target_os = "ios"))]

use std::ffi::CString;

use super::unix::{from_buf, realpath};
use crate::errno::Errno;

/// Resolves the running executable through
/// `_NSGetExecutablePath`, then canonicalizes it.
pub(super) fn program_path() -> Result<CString, Errno> {
    let mut buf = vec![0u8; crate::MAX_PATH];
    loop {
        let mut size = u32::try_from(buf.len()).map_err(|_| Errno::ERANGE)?;
        // SAFETY: FFI call, `buf` is valid for `size` bytes.
        let ret = unsafe { libc::_NSGetExecutablePath(buf.as_mut_ptr().cast(), &mut size) };
        if ret == 0 {
            break;
        }
        // `size` now holds the required length.
        buf.resize(usize::try_from(size).map_err(|_| Errno::ERANGE)?, 0);
    }
    // The executable path may contain symlinks and `..`.
    realpath(&from_buf(&buf)?)
}
