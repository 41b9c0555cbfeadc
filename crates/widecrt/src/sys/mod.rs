//! Platform backends.
//!
//! [`Platform`] is the one path/file interface the rest of the
//! crate talks to. Exactly one implementation is compiled in and
//! exported as [`Native`].

use core::ffi::c_int;
use std::ffi::CString;

use cfg_if::cfg_if;
use widestring::WideCStr;

use crate::{
    buf::{WideBuf, WideOut},
    error::Result,
    file::OwnedFile,
};

cfg_if! {
    if #[cfg(windows)] {
        pub(crate) mod windows;
        pub use windows::Windows as Native;
    } else if #[cfg(target_family = "unix")] {
        mod unix;
        pub use unix::Posix as Native;

        cfg_if! {
            if #[cfg(any(target_os = "linux", target_os = "android"))] {
                mod linux;
                use linux as os;
            } else if #[cfg(any(target_os = "macos", target_os = "ios"))] {
                mod macos;
                use macos as os;
            } else {
                compile_error!("unsupported OS");
            }
        }
    } else {
        compile_error!("unsupported OS");
    }
}

/// The platform's wide-character path and file primitives.
///
/// Every method takes wide strings and reports failures as
/// [`Error`][crate::Error]; how the backend reaches the OS is
/// its own business.
pub trait Platform {
    /// See `_wchdir`.
    fn chdir(path: &WideCStr) -> Result<()>;

    /// See `_wgetcwd`.
    fn getcwd(dst: WideBuf<'_>) -> Result<WideOut<'_>>;

    /// Resolves `src` to an absolute path. See `_wfullpath`.
    fn realpath<'a>(src: &WideCStr, dst: WideBuf<'a>) -> Result<WideOut<'a>>;

    /// Returns the path of the running executable. See
    /// `_get_pgmptr`.
    fn program_path() -> Result<CString>;

    /// See `_wfopen`.
    fn fopen(filename: &WideCStr, mode: &WideCStr) -> Result<OwnedFile>;

    /// See `_wremove`.
    fn remove(filename: &WideCStr) -> Result<()>;

    /// See `_wrename`.
    fn rename(old: &WideCStr, new: &WideCStr) -> Result<()>;

    /// Repositions `file` using a 64-bit offset. See
    /// `_fseeki64`.
    fn seek(file: &OwnedFile, off: i64, whence: c_int) -> Result<()>;

    /// Returns the 64-bit position of `file`. See `_ftelli64`.
    fn tell(file: &OwnedFile) -> Result<i64>;
}
