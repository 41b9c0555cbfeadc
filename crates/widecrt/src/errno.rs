use core::{ffi::c_int, fmt};

/// Returns the calling thread's `errno`.
pub fn errno() -> Errno {
    Errno::last()
}

/// The C library's `errno`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Errno(::errno::Errno);

impl Errno {
    /// `EINVAL`.
    pub const EINVAL: Errno = Errno::from_raw_os_error(libc::EINVAL);
    /// `ENOMEM`.
    pub const ENOMEM: Errno = Errno::from_raw_os_error(libc::ENOMEM);
    /// `EILSEQ`.
    pub const EILSEQ: Errno = Errno::from_raw_os_error(libc::EILSEQ);
    /// `ERANGE`.
    pub const ERANGE: Errno = Errno::from_raw_os_error(libc::ERANGE);
    /// `ENOENT`.
    pub const ENOENT: Errno = Errno::from_raw_os_error(libc::ENOENT);

    #[cfg(not(windows))]
    fn last() -> Self {
        Self(::errno::errno())
    }

    // The `errno` crate reads `GetLastError` on Windows, but the CRT
    // routines we call report through the CRT's own `errno`.
    #[cfg(windows)]
    fn last() -> Self {
        Self::from_raw_os_error(crate::sys::windows::crt_errno())
    }

    /// Creates an `Errno` from the raw error code.
    pub const fn from_raw_os_error(err: c_int) -> Self {
        Self(::errno::Errno(err))
    }

    /// Returns the underlying code.
    pub const fn code(self) -> c_int {
        self.0.0
    }

    /// Stores this value in the calling thread's `errno`.
    #[cfg(not(windows))]
    pub fn set(self) {
        ::errno::set_errno(self.0)
    }

    /// Stores this value in the calling thread's `errno`.
    #[cfg(windows)]
    pub fn set(self) {
        crate::sys::windows::set_crt_errno(self.code())
    }
}

impl core::error::Error for Errno {}

impl fmt::Debug for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Errno> for std::io::Error {
    fn from(err: Errno) -> Self {
        Self::from_raw_os_error(err.code())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// The codes this crate reports read the same as the C
    /// library's own messages.
    #[cfg(unix)]
    #[test]
    fn test_display_matches_strerror() {
        let tests = [
            Errno::EINVAL,
            Errno::ENOMEM,
            Errno::EILSEQ,
            Errno::ERANGE,
            Errno::ENOENT,
        ];
        for (i, err) in tests.into_iter().enumerate() {
            // SAFETY: FFI call, `strerror` returns a
            // null-terminated string.
            let want = unsafe { core::ffi::CStr::from_ptr(libc::strerror(err.code())) };
            let want = want.to_str().expect("messages are ASCII");
            assert_eq!(err.to_string(), want, "#{i}");
            assert_eq!(format!("{err:?}"), format!("{:?}", err.0), "#{i}");
        }
    }

    #[test]
    fn test_named_codes() {
        assert_eq!(Errno::EINVAL.code(), libc::EINVAL);
        assert_eq!(Errno::ENOMEM.code(), libc::ENOMEM);
        assert_eq!(Errno::EILSEQ.code(), libc::EILSEQ);
        assert_eq!(Errno::ERANGE.code(), libc::ERANGE);
        assert_eq!(Errno::ENOENT.code(), libc::ENOENT);
        assert_eq!(Errno::from_raw_os_error(libc::EACCES).code(), libc::EACCES);
    }

    #[test]
    fn test_io_error_keeps_code() {
        let err = std::io::Error::from(Errno::EILSEQ);
        assert_eq!(err.raw_os_error(), Some(libc::EILSEQ));
    }

    #[test]
    fn test_set_then_read() {
        Errno::ERANGE.set();
        assert_eq!(errno(), Errno::ERANGE);
        Errno::from_raw_os_error(0).set();
        assert_eq!(errno().code(), 0);
    }
}
