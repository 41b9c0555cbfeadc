use std::{
    ffi::{CStr, CString},
    sync::OnceLock,
};

use tracing::debug;
use widestring::WideCStr;

use crate::{
    buf::{WideBuf, WideOut},
    error::Result,
    file::OwnedFile,
    sys::{Native, Platform},
};

/// Changes the working directory. See `_wchdir`.
pub fn change_directory(path: &WideCStr) -> Result<()> {
    Native::chdir(path)
}

/// Returns the working directory. See `_wgetcwd`.
///
/// With [`WideBuf::Allocate`] the result is exactly as long as
/// the path plus its null terminator.
pub fn current_directory(dst: WideBuf<'_>) -> Result<WideOut<'_>> {
    Native::getcwd(dst)
}

/// Resolves `src` to an absolute path with every symbolic link
/// and `.`/`..` component removed. See `_wfullpath`.
///
/// Fails with [`Error::RangeTooSmall`][crate::Error::RangeTooSmall]
/// if the resolved path does not fit in `dst`, in which case
/// `dst` is not modified.
pub fn full_path<'a>(src: &WideCStr, dst: WideBuf<'a>) -> Result<WideOut<'a>> {
    Native::realpath(src, dst)
}

static PROGRAM_PATH: OnceLock<CString> = OnceLock::new();

/// Returns the path of the running executable. See
/// `_get_pgmptr`.
///
/// The path is resolved once and kept for the life of the
/// process. A failed resolution is not remembered.
pub fn program_path() -> Result<&'static CStr> {
    if let Some(path) = PROGRAM_PATH.get() {
        return Ok(path.as_c_str());
    }
    let path = Native::program_path()?;
    debug!(?path, "resolved program path");
    Ok(PROGRAM_PATH.get_or_init(|| path).as_c_str())
}

/// Opens a file. See `_wfopen`.
///
/// `mode` is an `fopen` mode string such as `"r"` or `"w+"`.
pub fn open_file(filename: &WideCStr, mode: &WideCStr) -> Result<OwnedFile> {
    Native::fopen(filename, mode)
}

/// Removes a file. See `_wremove`.
pub fn remove_file(filename: &WideCStr) -> Result<()> {
    Native::remove(filename)
}

/// Renames a file. See `_wrename`.
pub fn rename_file(old: &WideCStr, new: &WideCStr) -> Result<()> {
    Native::rename(old, new)
}
