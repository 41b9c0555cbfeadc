//! Output buffers with explicit ownership.

use core::ops::Deref;

use widestring::{WideCStr, WideCString, WideChar};

/// Where a wide-character result should be written.
#[derive(Debug)]
pub enum WideBuf<'a> {
    /// Write into the caller's buffer.
    ///
    /// The whole result, including the null terminator, must
    /// fit; otherwise the operation fails with
    /// [`Error::RangeTooSmall`][crate::Error::RangeTooSmall]
    /// and the buffer is left untouched.
    Caller(&'a mut [WideChar]),
    /// Allocate a buffer exactly large enough for the result and
    /// its null terminator.
    Allocate,
}

impl<'a> WideBuf<'a> {
    /// Mirrors the CRT convention: a null buffer or a capacity
    /// of zero requests allocation.
    pub fn from_caller(buf: Option<&'a mut [WideChar]>) -> Self {
        match buf {
            Some(buf) if !buf.is_empty() => Self::Caller(buf),
            _ => Self::Allocate,
        }
    }
}

/// A wide-character result.
#[derive(Debug, Eq, PartialEq)]
pub enum WideOut<'a> {
    /// The result was written into the caller's buffer.
    Written(&'a WideCStr),
    /// The result lives in a newly allocated buffer owned by the
    /// caller.
    Allocated(WideCString),
}

impl WideOut<'_> {
    /// Returns the result as a borrowed string.
    pub fn as_wide_cstr(&self) -> &WideCStr {
        match self {
            Self::Written(s) => s,
            Self::Allocated(s) => s,
        }
    }

    /// Reports whether the result was allocated.
    pub fn is_allocated(&self) -> bool {
        matches!(self, Self::Allocated(_))
    }

    /// Converts the result into an owned string, copying it out
    /// of the caller's buffer if necessary.
    pub fn into_owned(self) -> WideCString {
        match self {
            Self::Written(s) => s.to_ucstring(),
            Self::Allocated(s) => s,
        }
    }
}

impl Deref for WideOut<'_> {
    type Target = WideCStr;

    fn deref(&self) -> &Self::Target {
        self.as_wide_cstr()
    }
}

/// Copies a wide string that is already in its final encoding.
#[cfg(any(windows, test))]
pub(crate) fn copy_wide<'a>(src: &WideCStr, dst: WideBuf<'a>) -> crate::Result<WideOut<'a>> {
    let src = src.as_slice_with_nul();
    match dst {
        WideBuf::Allocate => {
            let mut buf = Vec::new();
            buf.try_reserve_exact(src.len())?;
            buf.extend_from_slice(src);
            let out = WideCString::from_vec_truncate(buf);
            Ok(WideOut::Allocated(out))
        }
        WideBuf::Caller(buf) => {
            let out = buf
                .get_mut(..src.len())
                .ok_or(crate::Error::RangeTooSmall)?;
            out.copy_from_slice(src);
            // SAFETY: `src` came from a `WideCStr`.
            Ok(WideOut::Written(unsafe { WideCStr::from_slice_unchecked(out) }))
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_copy_wide() {
        let src = WideCString::from_str("C:\\tmp").expect("no interior nul");

        let out = copy_wide(&src, WideBuf::Allocate).expect("allocates");
        assert_eq!(out.as_slice_with_nul().len(), 7);
        assert_eq!(out.into_owned(), src);

        let mut small: [WideChar; 6] = [0x55; 6];
        assert_eq!(
            copy_wide(&src, WideBuf::Caller(&mut small)),
            Err(crate::Error::RangeTooSmall)
        );
        assert_eq!(small, [0x55; 6]);

        let mut exact: [WideChar; 7] = [0x55; 7];
        let out = copy_wide(&src, WideBuf::Caller(&mut exact)).expect("fits");
        assert_eq!(out.as_wide_cstr(), src.as_ucstr());
    }

    #[test]
    fn test_from_caller() {
        let mut empty: [WideChar; 0] = [];
        assert!(matches!(
            WideBuf::from_caller(Some(&mut empty)),
            WideBuf::Allocate
        ));
        assert!(matches!(WideBuf::from_caller(None), WideBuf::Allocate));

        let mut buf: [WideChar; 4] = [0; 4];
        assert!(matches!(
            WideBuf::from_caller(Some(&mut buf)),
            WideBuf::Caller(b) if b.len() == 4
        ));
    }

    #[test]
    fn test_into_owned() {
        let want = WideCString::from_str("abc").expect("no interior nul");
        let out = WideOut::Written(&want);
        assert!(!out.is_allocated());
        assert_eq!(out.into_owned(), want);

        let out = WideOut::Allocated(want.clone());
        assert!(out.is_allocated());
        assert_eq!(&*out, want.as_ucstr());
    }
}
