use std::collections::TryReserveError;

use crate::errno::Errno;

/// An error returned by the translation layer.
///
/// Every variant maps onto exactly one `errno` value, which is
/// what C callers observe. See [`Error::errno`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// A required argument was null or zero-sized.
    #[error("invalid argument")]
    InvalidArgument,
    /// Allocating a conversion buffer failed.
    #[error("out of memory")]
    OutOfMemory,
    /// A wide or multibyte sequence is not representable in
    /// the active encoding.
    #[error("invalid or unrepresentable character sequence")]
    Encoding,
    /// The destination buffer is too small for the result.
    #[error("destination buffer is too small")]
    RangeTooSmall,
    /// The wrapped OS primitive failed.
    #[error(transparent)]
    Os(#[from] Errno),
}

impl Error {
    /// Returns the `errno` value that corresponds to this error.
    pub const fn errno(self) -> Errno {
        match self {
            Self::InvalidArgument => Errno::EINVAL,
            Self::OutOfMemory => Errno::ENOMEM,
            Self::Encoding => Errno::EILSEQ,
            Self::RangeTooSmall => Errno::ERANGE,
            Self::Os(err) => err,
        }
    }

    /// Stores [`Error::errno`] in the calling thread's `errno`.
    pub fn set_errno(self) {
        self.errno().set()
    }

    /// Reads the calling thread's `errno` after a failed libc
    /// call.
    pub(crate) fn last_os_error() -> Self {
        Self::Os(crate::errno::errno())
    }
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        err.errno().into()
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
