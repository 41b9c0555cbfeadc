//! Process locale setup.
//!
//! The C library's wide-character routines (`wprintf`,
//! `wcstombs`, ...) follow the process `LC_CTYPE`. Programs
//! built on this layer expect those routines to agree with the
//! layer's own UTF-8 conversions, so the first conversion
//! switches `LC_CTYPE` to a UTF-8 locale.

use std::{ffi::CStr, sync::OnceLock};

use tracing::{debug, warn};

#[cfg(not(windows))]
const CANDIDATES: &[&CStr] = &[c"C.UTF-8", c"en_US.UTF-8", c"UTF-8"];
#[cfg(windows)]
const CANDIDATES: &[&CStr] = &[c".UTF8"];

static LOCALE: OnceLock<Option<&'static CStr>> = OnceLock::new();

/// Switches `LC_CTYPE` to a UTF-8 locale.
///
/// Only the first call touches the process locale; concurrent
/// first callers block until it has been set. Every call
/// returns the accepted locale name, or `None` if the C library
/// accepted none of the candidates.
pub fn init() -> Option<&'static CStr> {
    *LOCALE.get_or_init(|| {
        for &name in CANDIDATES {
            // SAFETY: FFI call, `name` is null terminated.
            let ret = unsafe { libc::setlocale(libc::LC_CTYPE, name.as_ptr()) };
            if !ret.is_null() {
                debug!(locale = ?name, "set LC_CTYPE");
                return Some(name);
            }
        }
        warn!(candidates = ?CANDIDATES, "no UTF-8 locale available for LC_CTYPE");
        None
    })
}
